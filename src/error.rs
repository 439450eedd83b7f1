use crate::domain::checkout::Step;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Cannot {action} while in the {from} step")]
    InvalidTransition { from: Step, action: &'static str },
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),
    #[error("Unknown sort order: {0}")]
    UnknownSortOrder(String),
    #[error("Unknown fee type: {0}")]
    UnknownFeeType(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Unknown outcome: {0}")]
    UnknownOutcome(String),
    #[error("Invalid provider {id}: {reason}")]
    InvalidProvider { id: u32, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
