use super::transaction::{Amount, Currency, Provider};
use rust_decimal::Decimal;
use serde::Serialize;

/// A message the payment flow wants delivered to people.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// An online provider confirmed a payment for a registration that was already paid.
    DoublePayment {
        event_id: u32,
        registrant_id: u32,
        amount: Amount,
        currency: Currency,
        provider: Provider,
        recipients: Vec<String>,
    },
    PaymentConfirmation {
        event_id: u32,
        registrant_id: u32,
        email: String,
        amount: Amount,
        currency: Currency,
    },
    /// A successful payment did not match the price of the registration.
    AmountInconsistency {
        event_id: u32,
        registrant_id: u32,
        expected: Decimal,
        expected_currency: Currency,
        received: Amount,
        currency: Currency,
        recipients: Vec<String>,
    },
}

impl Notification {
    pub fn recipients(&self) -> Vec<String> {
        match self {
            Self::DoublePayment { recipients, .. } | Self::AmountInconsistency { recipients, .. } => {
                recipients.clone()
            }
            Self::PaymentConfirmation { email, .. } if !email.is_empty() => vec![email.clone()],
            Self::PaymentConfirmation { .. } => Vec::new(),
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Self::DoublePayment {
                event_id,
                registrant_id,
                ..
            } => format!(
                "[Event {}] Double payment detected for registrant {}",
                event_id, registrant_id
            ),
            Self::PaymentConfirmation { event_id, .. } => {
                format!("[Event {}] Payment confirmation", event_id)
            }
            Self::AmountInconsistency {
                event_id,
                registrant_id,
                ..
            } => format!(
                "[Event {}] Payment amount mismatch for registrant {}",
                event_id, registrant_id
            ),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::DoublePayment {
                event_id,
                registrant_id,
                amount,
                currency,
                provider,
                ..
            } => format!(
                "Registrant {} of event {} was already marked as paid, but '{}' \
                 reported another successful payment of {} {}. \
                 Please check the payment provider and refund if necessary.",
                registrant_id, event_id, provider, amount, currency
            ),
            Self::PaymentConfirmation {
                event_id,
                amount,
                currency,
                ..
            } => format!(
                "Your payment of {} {} for event {} has been received. Thank you!",
                amount, currency, event_id
            ),
            Self::AmountInconsistency {
                event_id,
                registrant_id,
                expected,
                expected_currency,
                received,
                currency,
                ..
            } => format!(
                "Registrant {} of event {} paid {} {} but the registration costs {} {}.",
                registrant_id,
                event_id,
                received,
                currency,
                expected.normalize(),
                expected_currency
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_double_payment_rendering() {
        let notification = Notification::DoublePayment {
            event_id: 3,
            registrant_id: 14,
            amount: Amount::new(dec!(50.00)).unwrap(),
            currency: Currency::new("EUR").unwrap(),
            provider: Provider::from("paypal"),
            recipients: vec!["admin@example.org".to_string()],
        };

        assert_eq!(
            notification.subject(),
            "[Event 3] Double payment detected for registrant 14"
        );
        assert!(notification.body().contains("'paypal' reported another successful payment of 50 EUR"));
        assert_eq!(notification.recipients(), vec!["admin@example.org"]);
    }

    #[test]
    fn test_confirmation_without_email_has_no_recipient() {
        let notification = Notification::PaymentConfirmation {
            event_id: 1,
            registrant_id: 1,
            email: String::new(),
            amount: Amount::new(dec!(10)).unwrap(),
            currency: Currency::new("CHF").unwrap(),
        };
        assert!(notification.recipients().is_empty());
        assert!(notification.body().contains("10 CHF"));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let notification = Notification::AmountInconsistency {
            event_id: 1,
            registrant_id: 2,
            expected: dec!(100),
            expected_currency: Currency::new("EUR").unwrap(),
            received: Amount::new(dec!(90)).unwrap(),
            currency: Currency::new("EUR").unwrap(),
            recipients: Vec::new(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["kind"], "amount_inconsistency");
        assert!(notification.body().contains("paid 90 EUR but the registration costs 100 EUR"));
    }
}
