pub mod provider_reader;
pub mod quote_writer;
