use super::transaction::{Amount, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registrant's registration for an event, as far as payment is concerned.
///
/// Tracks the amount due and whether the registration has been paid.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Registration {
    /// The event the registrant signed up for.
    #[serde(rename = "event")]
    pub event_id: u32,
    /// The registrant, unique within the event.
    #[serde(rename = "registrant")]
    pub registrant_id: u32,
    /// Where confirmations are sent.
    #[serde(default)]
    pub email: String,
    /// Total amount due.
    pub price: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub paid: bool,
}

impl Registration {
    pub fn new(
        event_id: u32,
        registrant_id: u32,
        email: impl Into<String>,
        price: Decimal,
        currency: Currency,
    ) -> Self {
        Self {
            event_id,
            registrant_id,
            email: email.into(),
            price,
            currency,
            paid: false,
        }
    }

    pub fn key(&self) -> (u32, u32) {
        (self.event_id, self.registrant_id)
    }

    pub fn set_paid(&mut self, paid: bool) {
        self.paid = paid;
    }

    /// Whether a payment of `amount` in `currency` settles exactly what is due.
    pub fn price_matches(&self, amount: Amount, currency: &Currency) -> bool {
        self.price == amount.value() && &self.currency == currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn registration() -> Registration {
        Registration::new(1, 2, "jane@example.org", dec!(120.00), Currency::new("EUR").unwrap())
    }

    #[test]
    fn test_new_registration_is_unpaid() {
        let reg = registration();
        assert!(!reg.paid);
        assert_eq!(reg.key(), (1, 2));
    }

    #[test]
    fn test_set_paid() {
        let mut reg = registration();
        reg.set_paid(true);
        assert!(reg.paid);
        reg.set_paid(false);
        assert!(!reg.paid);
    }

    #[test]
    fn test_price_matches() {
        let reg = registration();
        let eur = Currency::new("EUR").unwrap();
        let usd = Currency::new("USD").unwrap();

        assert!(reg.price_matches(Amount::new(dec!(120)).unwrap(), &eur));
        assert!(!reg.price_matches(Amount::new(dec!(100)).unwrap(), &eur));
        assert!(!reg.price_matches(Amount::new(dec!(120)).unwrap(), &usd));
    }
}
