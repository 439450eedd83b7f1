use crate::domain::comparison::RateQuote;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// A comparison row flattened for output.
#[derive(Debug, Serialize, PartialEq)]
pub struct QuoteRow {
    pub provider: String,
    pub fee: String,
    pub processing_time: String,
    pub received: String,
    pub rating: String,
    pub business_friendly: bool,
    pub best: bool,
}

impl From<&RateQuote<'_>> for QuoteRow {
    fn from(quote: &RateQuote<'_>) -> Self {
        let provider = quote.provider;
        Self {
            provider: provider.name.clone(),
            fee: provider.fee_label(),
            processing_time: provider.processing_time.clone(),
            received: format!("{:.2}", quote.display_received()),
            rating: format!("{}/5", provider.rating.normalize()),
            business_friendly: provider.business_friendly,
            best: provider.is_best,
        }
    }
}

/// Writes comparison results as CSV, one row per visible provider.
pub struct QuoteWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> QuoteWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_quotes(&mut self, quotes: &[RateQuote<'_>]) -> Result<()> {
        for quote in quotes {
            self.writer.serialize(QuoteRow::from(quote))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
