use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Percentage,
    Fixed,
    Spread,
}

impl FromStr for FeeType {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(FeeType::Percentage),
            "fixed" => Ok(FeeType::Fixed),
            "spread" => Ok(FeeType::Spread),
            _ => Err(PaymentError::UnknownFeeType(s.to_string())),
        }
    }
}

/// One row of the provider comparison table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ProviderRecord {
    pub id: u32,
    pub name: String,
    pub fee: Decimal,
    #[serde(deserialize_with = "deserialize_fee_type")]
    pub fee_type: FeeType,
    /// Human readable range, e.g. "2-5 mins".
    pub processing_time: String,
    pub processing_time_minutes: Decimal,
    /// Percentage of the amount the recipient keeps. Only meaningful for percentage fees.
    pub payout: Decimal,
    pub rating: Decimal,
    #[serde(deserialize_with = "deserialize_features")]
    pub features: Vec<String>,
    pub business_friendly: bool,
    pub key_notes: String,
    pub is_best: bool,
}

fn deserialize_fee_type<'de, D>(deserializer: D) -> std::result::Result<FeeType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

// Features travel as a single `|`-separated cell.
fn deserialize_features<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split('|')
        .map(str::trim)
        .filter(|feature| !feature.is_empty())
        .map(String::from)
        .collect())
}

impl ProviderRecord {
    /// Fee as shown in the table: `"0.5%"` for percentage fees, `"$2"` otherwise.
    pub fn fee_label(&self) -> String {
        match self.fee_type {
            FeeType::Percentage => format!("{}%", self.fee.normalize()),
            FeeType::Fixed | FeeType::Spread => format!("${}", self.fee.normalize()),
        }
    }

    /// Amount the recipient ends up with when `amount` is sent through this provider.
    ///
    /// Spread providers are priced like fixed ones.
    pub fn received(&self, amount: Decimal) -> Decimal {
        match self.fee_type {
            FeeType::Percentage => amount * self.payout / dec!(100),
            FeeType::Fixed | FeeType::Spread => amount - self.fee,
        }
    }

    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle)
            || self
                .features
                .iter()
                .any(|feature| feature.to_lowercase().contains(needle))
    }

    fn validate(&self) -> Result<()> {
        let numeric = [
            ("fee", self.fee),
            ("processing_time_minutes", self.processing_time_minutes),
            ("payout", self.payout),
            ("rating", self.rating),
        ];
        if let Some((field, _)) = numeric.iter().find(|(_, value)| *value < Decimal::ZERO) {
            return Err(self.invalid(format!("{field} must not be negative")));
        }
        if self.rating > dec!(5) {
            return Err(self.invalid("rating must be between 0 and 5".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> PaymentError {
        PaymentError::InvalidProvider {
            id: self.id,
            reason,
        }
    }
}

/// Checks the invariants of a whole provider table.
pub fn validate_providers(providers: &[ProviderRecord]) -> Result<()> {
    let mut seen = HashSet::new();
    for provider in providers {
        provider.validate()?;
        if !seen.insert(provider.id) {
            return Err(provider.invalid("duplicate provider id".to_string()));
        }
    }
    let best: Vec<_> = providers.iter().filter(|p| p.is_best).collect();
    if let [_, second, ..] = best.as_slice() {
        return Err(second.invalid("only one provider may be flagged as best".to_string()));
    }
    Ok(())
}
