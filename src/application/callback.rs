use crate::domain::transaction::{Currency, Provider, TransactionAction};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A payment provider callback, or an organizer recording a payment by hand.
///
/// `amount` and `currency` default to what the registration costs. Without an explicit
/// `timestamp` the engine stamps the transaction with the current time.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCallback {
    pub event_id: u32,
    pub registrant_id: u32,
    pub action: TransactionAction,
    pub provider: Provider,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub timestamp: Option<DateTime<Utc>>,
    pub data: serde_json::Value,
}

impl PaymentCallback {
    pub fn new(
        event_id: u32,
        registrant_id: u32,
        action: TransactionAction,
        provider: impl Into<Provider>,
    ) -> Self {
        Self {
            event_id,
            registrant_id,
            action,
            provider: provider.into(),
            amount: None,
            currency: None,
            timestamp: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_amount(mut self, amount: Decimal, currency: Currency) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
