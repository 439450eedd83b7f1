use crate::domain::comparison::{ComparisonQuery, RateQuote, REFERENCE_PRESETS, compare_rates};
use crate::domain::provider::{ProviderRecord, validate_providers};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

/// Compares the configured providers for a given query.
///
/// The provider table is validated once at construction and never changes afterwards,
/// so [`RateComparisonEngine::query`] is a pure function of its argument.
#[derive(Debug, Clone)]
pub struct RateComparisonEngine {
    providers: Vec<ProviderRecord>,
    presets: Vec<Decimal>,
}

impl RateComparisonEngine {
    /// Creates an engine offering the default reference amounts.
    pub fn new(providers: Vec<ProviderRecord>) -> Result<Self> {
        Self::with_presets(providers, REFERENCE_PRESETS.to_vec())
    }

    pub fn with_presets(providers: Vec<ProviderRecord>, presets: Vec<Decimal>) -> Result<Self> {
        validate_providers(&providers)?;
        if presets.is_empty() {
            return Err(PaymentError::InvalidConfig(
                "at least one reference amount is required".to_string(),
            ));
        }
        tracing::debug!(providers = providers.len(), "rate comparison table loaded");
        Ok(Self { providers, presets })
    }

    pub fn providers(&self) -> &[ProviderRecord] {
        &self.providers
    }

    pub fn presets(&self) -> &[Decimal] {
        &self.presets
    }

    /// The provider flagged with the best rate, if any.
    pub fn best(&self) -> Option<&ProviderRecord> {
        self.providers.iter().find(|p| p.is_best)
    }

    /// A default query using the first configured reference amount.
    pub fn default_query(&self) -> ComparisonQuery {
        ComparisonQuery {
            reference_amount: self.presets[0],
            ..ComparisonQuery::default()
        }
    }

    /// Filters, sorts and prices the table.
    ///
    /// Fails when the reference amount is not one of the configured presets.
    pub fn query(&self, query: &ComparisonQuery) -> Result<Vec<RateQuote<'_>>> {
        if !self.presets.contains(&query.reference_amount) {
            return Err(PaymentError::ValidationError(format!(
                "reference amount {} is not one of the offered presets",
                query.reference_amount
            )));
        }
        Ok(compare_rates(&self.providers, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::FeeType;
    use crate::domain::provider::tests::provider;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejects_invalid_table() {
        let mut a = provider(1, "A", FeeType::Percentage);
        a.payout = dec!(-1);
        assert!(RateComparisonEngine::new(vec![a]).is_err());
    }

    #[test]
    fn test_rejects_unknown_reference_amount() {
        let engine = RateComparisonEngine::new(vec![provider(1, "A", FeeType::Percentage)]).unwrap();
        let query = ComparisonQuery {
            reference_amount: dec!(250),
            ..Default::default()
        };
        assert!(matches!(
            engine.query(&query),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_custom_presets() {
        let engine = RateComparisonEngine::with_presets(
            vec![provider(1, "A", FeeType::Percentage)],
            vec![dec!(250)],
        )
        .unwrap();
        let quotes = engine.query(&engine.default_query()).unwrap();
        assert_eq!(quotes[0].received, dec!(248.75));
        assert!(RateComparisonEngine::with_presets(vec![], vec![]).is_err());
    }
}
