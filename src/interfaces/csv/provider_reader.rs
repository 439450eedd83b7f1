use crate::domain::provider::ProviderRecord;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads provider records from a CSV source.
///
/// Expects a header row naming the `ProviderRecord` fields. The `features` column
/// holds a `|`-separated list. Surrounding whitespace is trimmed from every cell.
pub struct ProviderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ProviderReader<R> {
    /// Creates a new `ProviderReader` from any `Read` source (e.g., File, a byte slice).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily deserializes provider rows.
    pub fn providers(self) -> impl Iterator<Item = Result<ProviderRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }

    /// Reads the whole table, failing on the first malformed row.
    pub fn read_all(self) -> Result<Vec<ProviderRecord>> {
        self.providers().collect()
    }
}
