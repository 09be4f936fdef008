use crate::domain::registration::Registration;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads registrations from a CSV source.
///
/// Expected columns: `event, registrant, email, price, currency` and optionally `paid`.
pub struct RegistrationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RegistrationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn registrations(self) -> impl Iterator<Item = Result<Registration>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_registrations() {
        let data = "event, registrant, email, price, currency\n\
                    1, 1, jane@example.org, 120.00, EUR\n\
                    1, 2, , 60, chf";
        let reader = RegistrationReader::new(data.as_bytes());
        let registrations: Vec<Registration> =
            reader.registrations().collect::<Result<_>>().unwrap();

        assert_eq!(registrations.len(), 2);
        assert_eq!(registrations[0].email, "jane@example.org");
        assert_eq!(registrations[0].price, dec!(120));
        assert!(!registrations[0].paid);
        assert_eq!(registrations[1].email, "");
        assert_eq!(registrations[1].currency, Currency::new("CHF").unwrap());
    }

    #[test]
    fn test_reader_rejects_bad_currency() {
        let data = "event, registrant, email, price, currency\n1, 1, a@b.c, 10, EURO";
        let reader = RegistrationReader::new(data.as_bytes());
        let results: Vec<_> = reader.registrations().collect();
        assert!(results[0].is_err());
    }
}
