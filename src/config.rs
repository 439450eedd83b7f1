//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields
//! the stock demo behaviour.

use crate::domain::checkout::CHECKOUT_FEE;
use crate::domain::comparison::REFERENCE_PRESETS;
use crate::error::{PaymentError, Result};
use crate::infrastructure::outcome::RandomOutcomePolicy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Checkout flow settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutConfig {
    /// Fee added to the entered amount in the summary.
    #[serde(default = "default_fee")]
    pub fee: Decimal,
    /// How long the simulated processing step takes.
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,
    /// Probability that a simulated attempt succeeds.
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    /// Wallets offered on the wallet step.
    #[serde(default = "default_wallets")]
    pub wallets: Vec<String>,
}

fn default_fee() -> Decimal {
    CHECKOUT_FEE
}

fn default_processing_delay_ms() -> u64 {
    2000
}

fn default_success_rate() -> f64 {
    RandomOutcomePolicy::DEFAULT_SUCCESS_RATE
}

fn default_wallets() -> Vec<String> {
    ["MetaMask", "WalletConnect", "Coinbase Wallet"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            fee: default_fee(),
            processing_delay_ms: default_processing_delay_ms(),
            success_rate: default_success_rate(),
            wallets: default_wallets(),
        }
    }
}

impl CheckoutConfig {
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

/// Rate comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatesConfig {
    #[serde(default = "default_reference_presets")]
    pub reference_presets: Vec<Decimal>,
    /// CSV file replacing the built-in provider table.
    #[serde(default)]
    pub providers: Option<PathBuf>,
}

fn default_reference_presets() -> Vec<Decimal> {
    REFERENCE_PRESETS.to_vec()
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            reference_presets: default_reference_presets(),
            providers: None,
        }
    }
}

impl AppConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let rate = self.checkout.success_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(PaymentError::InvalidConfig(format!(
                "checkout.success_rate {rate} is outside [0, 1]"
            )));
        }
        if self.checkout.fee < Decimal::ZERO {
            return Err(PaymentError::InvalidConfig(
                "checkout.fee must not be negative".to_string(),
            ));
        }
        if self.rates.reference_presets.is_empty() {
            return Err(PaymentError::InvalidConfig(
                "rates.reference_presets must not be empty".to_string(),
            ));
        }
        if self.rates.reference_presets.iter().any(|p| *p <= Decimal::ZERO) {
            return Err(PaymentError::InvalidConfig(
                "rates.reference_presets must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
