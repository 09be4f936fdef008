use crate::domain::transaction::InvalidTransactionStatus;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("No registration for registrant {registrant} in event {event}")]
    UnknownRegistration { event: u32, registrant: u32 },
    #[error("Payment provider '{provider}' is not enabled for event {event}")]
    UnsupportedProvider { provider: String, event: u32 },
    #[error("Payment provider '{provider}' does not accept {currency}")]
    UnsupportedCurrency { provider: String, currency: String },
    #[error(
        "A transaction for registrant {registrant} in event {event} already exists at {timestamp}"
    )]
    DuplicateTransaction {
        event: u32,
        registrant: u32,
        timestamp: DateTime<Utc>,
    },
    #[error(transparent)]
    InvalidTransactionStatus(#[from] InvalidTransactionStatus),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
