use crate::application::callback::PaymentCallback;
use crate::domain::transaction::{Currency, Provider, TransactionAction};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CallbackRecord {
    event: u32,
    registrant: u32,
    action: String,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    data: Option<String>,
}

impl TryFrom<CallbackRecord> for PaymentCallback {
    type Error = PaymentError;

    fn try_from(record: CallbackRecord) -> Result<Self> {
        let action: TransactionAction = record.action.parse()?;
        let currency = record
            .currency
            .filter(|code| !code.is_empty())
            .map(|code| Currency::new(&code))
            .transpose()?;
        // provider payloads are usually JSON, but keep anything else verbatim
        let data = match record.data.filter(|data| !data.is_empty()) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)),
            None => serde_json::Value::Null,
        };

        Ok(Self {
            event_id: record.event,
            registrant_id: record.registrant,
            action,
            provider: Provider::from(record.provider.unwrap_or_default()),
            amount: record.amount,
            currency,
            timestamp: record.timestamp,
            data,
        })
    }
}

/// Reads payment callbacks from a CSV source.
///
/// Expected columns: `event, registrant, action, provider, amount, currency, timestamp, data`.
/// Everything after `action` may be left empty; an empty provider means a manual payment.
pub struct CallbackReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallbackReader<R> {
    /// Creates a new `CallbackReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts callbacks.
    pub fn callbacks(self) -> impl Iterator<Item = Result<PaymentCallback>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(PaymentError::from)
                .and_then(|record: CallbackRecord| record.try_into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "event, registrant, action, provider, amount, currency, timestamp, data\n\
                    1, 1, complete, _manual, , , , \n\
                    1, 2, pending, paypal, 12.50, eur, 2024-05-01T10:00:00Z,\"{\"\"txn_id\"\": \"\"PP-1\"\"}\"";
        let reader = CallbackReader::new(data.as_bytes());
        let results: Vec<Result<PaymentCallback>> = reader.callbacks().collect();

        assert_eq!(results.len(), 2);
        let manual = results[0].as_ref().unwrap();
        assert_eq!(manual.provider, Provider::Manual);
        assert_eq!(manual.action, TransactionAction::Complete);
        assert_eq!(manual.amount, None);
        assert_eq!(manual.data, serde_json::Value::Null);

        let paypal = results[1].as_ref().unwrap();
        assert_eq!(paypal.registrant_id, 2);
        assert_eq!(paypal.provider, Provider::from("paypal"));
        assert_eq!(paypal.amount, Some(dec!(12.50)));
        assert_eq!(paypal.currency, Some(Currency::new("EUR").unwrap()));
        assert!(paypal.timestamp.is_some());
        assert_eq!(paypal.data["txn_id"], "PP-1");
    }

    #[test]
    fn test_reader_short_rows() {
        let data = "event, registrant, action, provider\n3, 4, reject, paypal";
        let reader = CallbackReader::new(data.as_bytes());
        let callback = reader.callbacks().next().unwrap().unwrap();
        assert_eq!(callback.action, TransactionAction::Reject);
        assert_eq!(callback.currency, None);
    }

    #[test]
    fn test_reader_non_json_data_kept_verbatim() {
        let data = "event,registrant,action,provider,amount,currency,timestamp,data\n\
                    1,1,complete,paypal,,,,receipt 42";
        let reader = CallbackReader::new(data.as_bytes());
        let callback = reader.callbacks().next().unwrap().unwrap();
        assert_eq!(callback.data, serde_json::json!("receipt 42"));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "event, registrant, action, provider\n\
                    1, 1, refund, paypal\n\
                    1, x, complete, paypal";
        let reader = CallbackReader::new(data.as_bytes());
        let results: Vec<Result<PaymentCallback>> = reader.callbacks().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_reader_action_is_case_insensitive() {
        let data = "event,registrant,action,provider\n1,1,Complete,paypal\n1,2,REJECT,paypal";
        let reader = CallbackReader::new(data.as_bytes());
        let actions: Vec<TransactionAction> = reader
            .callbacks()
            .map(|result| result.unwrap().action)
            .collect();
        assert_eq!(
            actions,
            vec![TransactionAction::Complete, TransactionAction::Reject]
        );
    }

    #[test]
    fn test_reader_unknown_action() {
        let data = "event,registrant,action,provider\n1,1,refund,paypal";
        let reader = CallbackReader::new(data.as_bytes());
        let result = reader.callbacks().next().unwrap();
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    }

    #[test]
    fn test_reader_bad_currency() {
        let data = "event,registrant,action,provider,amount,currency\n1,1,complete,paypal,10,EURO";
        let reader = CallbackReader::new(data.as_bytes());
        let result = reader.callbacks().next().unwrap();
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    }
}
