use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Textual sentinel used by callbacks and the ledger for the manual provider.
pub const MANUAL_PROVIDER: &str = "_manual";

/// A stored status code that does not map to any [`TransactionStatus`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid transaction status code {0}")]
pub struct InvalidTransactionStatus(pub u8);

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Successful,
    Cancelled,
    Failed,
    Pending,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

impl From<TransactionStatus> for u8 {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Successful => 1,
            TransactionStatus::Cancelled => 2,
            TransactionStatus::Failed => 3,
            TransactionStatus::Pending => 4,
            TransactionStatus::Rejected => 5,
        }
    }
}

impl TryFrom<u8> for TransactionStatus {
    type Error = InvalidTransactionStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Successful),
            2 => Ok(Self::Cancelled),
            3 => Ok(Self::Failed),
            4 => Ok(Self::Pending),
            5 => Ok(Self::Rejected),
            other => Err(InvalidTransactionStatus(other)),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a provider callback (or an organizer) asks to happen to a payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionAction {
    Complete,
    Cancel,
    Pending,
    Reject,
}

impl TransactionAction {
    pub const ALL: [Self; 4] = [Self::Complete, Self::Cancel, Self::Pending, Self::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Pending => "pending",
            Self::Reject => "reject",
        }
    }
}

impl From<TransactionAction> for u8 {
    fn from(action: TransactionAction) -> Self {
        match action {
            TransactionAction::Complete => 1,
            TransactionAction::Cancel => 2,
            TransactionAction::Pending => 3,
            TransactionAction::Reject => 4,
        }
    }
}

impl FromStr for TransactionAction {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            "pending" => Ok(Self::Pending),
            "reject" => Ok(Self::Reject),
            other => Err(PaymentError::ValidationError(format!(
                "Unknown transaction action '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payment backend a transaction came from.
///
/// `Manual` stands for an organizer recording an offline payment by hand; every
/// other backend is an online payment plugin identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Manual,
    Plugin(String),
}

impl Provider {
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Manual => MANUAL_PROVIDER,
            Self::Plugin(name) => name,
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        let name = value.trim();
        if name.is_empty() || name == MANUAL_PROVIDER {
            Self::Manual
        } else {
            Self::Plugin(name.to_string())
        }
    }
}

impl From<&str> for Provider {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.name().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a positive monetary amount for transactions.
///
/// Ensures that transaction amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Three-letter currency code, stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, PaymentError> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(PaymentError::ValidationError(format!(
                "Invalid currency code '{}'",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transaction that has been decided but not yet appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub event_id: u32,
    pub registrant_id: u32,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub currency: Currency,
    pub provider: Provider,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

/// One entry of a registrant's payment ledger.
///
/// Entries are only ever appended: every status change is a new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: u64,
    pub event_id: u32,
    pub registrant_id: u32,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub currency: Currency,
    pub provider: Provider,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl PaymentTransaction {
    pub fn from_new(id: u64, tx: NewTransaction) -> Self {
        Self {
            id,
            event_id: tx.event_id,
            registrant_id: tx.registrant_id,
            status: tx.status,
            amount: tx.amount,
            currency: tx.currency,
            provider: tx.provider,
            timestamp: tx.timestamp,
            data: tx.data,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.provider.is_manual()
    }
}
