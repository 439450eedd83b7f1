use crate::error::{PaymentError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flat network fee added on top of every checkout amount, in the checkout currency.
pub const CHECKOUT_FEE: Decimal = dec!(0.10);

/// Position of a checkout flow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Amount,
    Wallet,
    Processing,
    Success,
    Error,
}

impl Step {
    /// The three progress dots shown above the flow: amount, wallet, processing.
    ///
    /// A dot is lit for the current step; once the attempt has settled every dot is lit.
    pub fn indicator(self) -> [bool; 3] {
        match self {
            Step::Amount => [true, false, false],
            Step::Wallet => [false, true, false],
            Step::Processing => [false, false, true],
            Step::Success | Step::Error => [true, true, true],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Amount => "amount",
            Step::Wallet => "wallet",
            Step::Processing => "processing",
            Step::Success => "success",
            Step::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usdc,
    Usdt,
    Dai,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Currency::Usdc => "USDC",
            Currency::Usdt => "USDT",
            Currency::Dai => "DAI",
        };
        f.write_str(symbol)
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(Currency::Usdc),
            "USDT" => Ok(Currency::Usdt),
            "DAI" => Ok(Currency::Dai),
            _ => Err(PaymentError::UnknownCurrency(s.to_string())),
        }
    }
}

/// Result of one processing attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl FromStr for Outcome {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Outcome::Success),
            "failure" | "error" => Ok(Outcome::Failure),
            _ => Err(PaymentError::UnknownOutcome(s.to_string())),
        }
    }
}

/// A positive checkout amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    /// Parses user input into a positive amount.
    pub fn parse(input: &str) -> Result<Self> {
        let value = parse_decimal(input).ok_or_else(|| {
            PaymentError::ValidationError(format!("'{input}' is not a number"))
        })?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

// Accepts "12.5", " 12.5 " and "1.25e1"; rejects trailing garbage.
fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Serializable state of a single checkout flow instance.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct CheckoutState {
    pub step: Step,
    /// Raw user input; only validated on submit.
    pub amount: String,
    pub currency: Currency,
    pub selected_wallet: Option<String>,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the amount currently entered would be accepted by `submit_amount`.
    pub fn can_submit(&self) -> bool {
        self.step == Step::Amount && Amount::parse(&self.amount).is_ok()
    }

    /// Live edit of the amount field.
    pub fn edit_amount(&mut self, value: impl Into<String>) -> Result<()> {
        self.expect_step(Step::Amount, "edit the amount")?;
        self.amount = value.into();
        Ok(())
    }

    pub fn set_currency(&mut self, currency: Currency) -> Result<()> {
        self.expect_step(Step::Amount, "change the currency")?;
        self.currency = currency;
        Ok(())
    }

    /// Amount -> Wallet. Leaves the state untouched when the amount is not positive.
    pub fn submit_amount(&mut self, value: &str, currency: Currency) -> Result<()> {
        self.expect_step(Step::Amount, "submit an amount")?;
        Amount::parse(value)?;
        self.amount = value.to_string();
        self.currency = currency;
        self.step = Step::Wallet;
        Ok(())
    }

    /// Wallet -> Processing.
    pub fn select_wallet(&mut self, wallet: impl Into<String>) -> Result<()> {
        self.expect_step(Step::Wallet, "select a wallet")?;
        self.selected_wallet = Some(wallet.into());
        self.step = Step::Processing;
        Ok(())
    }

    /// Wallet -> Amount, keeping amount and currency.
    pub fn go_back(&mut self) -> Result<()> {
        self.expect_step(Step::Wallet, "go back")?;
        self.step = Step::Amount;
        Ok(())
    }

    /// Processing -> Success | Error.
    pub fn settle(&mut self, outcome: Outcome) -> Result<()> {
        self.expect_step(Step::Processing, "settle")?;
        self.step = match outcome {
            Outcome::Success => Step::Success,
            Outcome::Failure => Step::Error,
        };
        Ok(())
    }

    /// Error -> Wallet.
    pub fn retry(&mut self) -> Result<()> {
        self.expect_step(Step::Error, "retry")?;
        self.step = Step::Wallet;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Entered amount plus the fee. Non-numeric input counts as zero; saturates at
    /// the decimal range instead of overflowing.
    pub fn total(&self, fee: Decimal) -> Decimal {
        parse_decimal(&self.amount)
            .unwrap_or(Decimal::ZERO)
            .saturating_add(fee)
    }

    /// Total formatted the way the checkout summary shows it, e.g. `"25.10 USDC"`.
    pub fn total_display(&self, fee: Decimal) -> String {
        let total = self
            .total(fee)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.2} {}", total, self.currency)
    }

    pub fn success_message(&self) -> String {
        format!(
            "Your payment of {} {} has been processed successfully.",
            self.amount, self.currency
        )
    }

    fn expect_step(&self, expected: Step, action: &'static str) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(PaymentError::InvalidTransition {
                from: self.step,
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_wallet() -> CheckoutState {
        let mut state = CheckoutState::new();
        state.submit_amount("25", Currency::Usdt).unwrap();
        state
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::parse("1.0").is_ok());
        assert!(Amount::parse(" 2.5 ").is_ok());
        assert!(Amount::parse("1e2").is_ok());
        assert!(matches!(
            Amount::parse("0"),
            Err(PaymentError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::parse("-1.0"),
            Err(PaymentError::ValidationError(_))
        ));
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("12abc").is_err());
    }

    #[test]
    fn test_submit_valid_amount_moves_to_wallet() {
        let state = at_wallet();
        assert_eq!(state.step, Step::Wallet);
        assert_eq!(state.amount, "25");
        assert_eq!(state.currency, Currency::Usdt);
    }

    #[test]
    fn test_submit_invalid_amount_leaves_state_unchanged() {
        for input in ["", "0", "-5", "0.00", "ten"] {
            let mut state = CheckoutState::new();
            state.edit_amount("3").unwrap();
            let before = state.clone();
            assert!(state.submit_amount(input, Currency::Dai).is_err());
            assert_eq!(state, before, "input {input:?} changed the state");
        }
    }

    #[test]
    fn test_select_wallet_records_choice() {
        let mut state = at_wallet();
        state.select_wallet("MetaMask").unwrap();
        assert_eq!(state.step, Step::Processing);
        assert_eq!(state.selected_wallet.as_deref(), Some("MetaMask"));
    }

    #[test]
    fn test_go_back_keeps_amount_and_currency() {
        let mut state = at_wallet();
        state.go_back().unwrap();
        assert_eq!(state.step, Step::Amount);
        assert_eq!(state.amount, "25");
        assert_eq!(state.currency, Currency::Usdt);
    }

    #[test]
    fn test_go_back_only_from_wallet() {
        let mut state = CheckoutState::new();
        assert!(matches!(
            state.go_back(),
            Err(PaymentError::InvalidTransition {
                from: Step::Amount,
                ..
            })
        ));
    }

    #[test]
    fn test_settle_and_retry() {
        let mut state = at_wallet();
        state.select_wallet("WalletConnect").unwrap();
        state.settle(Outcome::Failure).unwrap();
        assert_eq!(state.step, Step::Error);

        state.retry().unwrap();
        assert_eq!(state.step, Step::Wallet);

        state.select_wallet("Coinbase Wallet").unwrap();
        state.settle(Outcome::Success).unwrap();
        assert_eq!(state.step, Step::Success);
        assert!(state.retry().is_err());
        assert!(state.settle(Outcome::Failure).is_err());
    }

    #[test]
    fn test_total_adds_fee() {
        let mut state = CheckoutState::new();
        assert_eq!(state.total_display(CHECKOUT_FEE), "0.10 USDC");

        state.edit_amount("25").unwrap();
        assert_eq!(state.total(CHECKOUT_FEE), dec!(25.10));
        assert_eq!(state.total_display(CHECKOUT_FEE), "25.10 USDC");

        state.edit_amount("not a number").unwrap();
        assert_eq!(state.total(CHECKOUT_FEE), dec!(0.10));
    }

    #[test]
    fn test_total_rounds_half_away_from_zero() {
        let mut state = CheckoutState::new();
        state.edit_amount("0.125").unwrap();
        assert_eq!(state.total_display(CHECKOUT_FEE), "0.23 USDC");
        state.edit_amount("-0.125").unwrap();
        assert_eq!(state.total_display(CHECKOUT_FEE), "-0.03 USDC");
    }

    #[test]
    fn test_total_saturates_on_huge_amounts() {
        let max = Decimal::MAX.to_string();
        let mut state = CheckoutState::new();
        state.submit_amount(&max, Currency::Usdc).unwrap();
        assert_eq!(state.total(dec!(1.5)), Decimal::MAX);
        assert_eq!(state.total_display(dec!(1.5)), format!("{max}.00 USDC"));
    }

    #[test]
    fn test_can_submit() {
        let mut state = CheckoutState::new();
        assert!(!state.can_submit());
        state.edit_amount("0.01").unwrap();
        assert!(state.can_submit());
    }

    #[test]
    fn test_step_indicator() {
        assert_eq!(Step::Wallet.indicator(), [false, true, false]);
        assert_eq!(Step::Error.indicator(), [true, true, true]);
    }

    #[test]
    fn test_state_serialization() {
        let mut state = at_wallet();
        state.select_wallet("MetaMask").unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"step":"processing","amount":"25","currency":"USDT","selected_wallet":"MetaMask"}"#
        );
        let back: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usdc".parse::<Currency>().unwrap(), Currency::Usdc);
        assert_eq!("DAI".parse::<Currency>().unwrap(), Currency::Dai);
        assert!(matches!(
            "EUR".parse::<Currency>(),
            Err(PaymentError::UnknownCurrency(_))
        ));
    }
}
