use crate::domain::provider::ProviderRecord;
use crate::error::Result;
use crate::interfaces::csv::provider_reader::ProviderReader;
use std::fs::File;
use std::path::Path;

const BUILT_IN_PROVIDERS: &str = include_str!("../../data/providers.csv");

/// The comparison table shipped with the binary.
pub fn built_in_providers() -> Result<Vec<ProviderRecord>> {
    ProviderReader::new(BUILT_IN_PROVIDERS.as_bytes()).read_all()
}

/// Loads a replacement provider table from a CSV file.
pub fn load_providers(path: impl AsRef<Path>) -> Result<Vec<ProviderRecord>> {
    let file = File::open(path)?;
    ProviderReader::new(file).read_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::validate_providers;
    use rust_decimal_macros::dec;

    #[test]
    fn test_built_in_table_is_valid() {
        let providers = built_in_providers().unwrap();
        assert_eq!(providers.len(), 8);
        validate_providers(&providers).unwrap();

        let best: Vec<_> = providers.iter().filter(|p| p.is_best).collect();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].name, "StablePay");
        assert_eq!(best[0].payout, dec!(99.90));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_providers("does/not/exist.csv").is_err());
    }
}
