use crate::application::engine::RegistrationSummary;
use crate::error::Result;
use std::io::Write;

/// Writes the final payment state of registrations as CSV.
pub struct RegistrationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RegistrationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_summaries(&mut self, summaries: Vec<RegistrationSummary>) -> Result<()> {
        self.writer
            .write_record(["event", "registrant", "price", "currency", "paid", "status"])?;
        for summary in summaries {
            let registration = summary.registration;
            self.writer.write_record([
                registration.event_id.to_string(),
                registration.registrant_id.to_string(),
                registration.price.normalize().to_string(),
                registration.currency.to_string(),
                registration.paid.to_string(),
                summary
                    .status
                    .map(|status| status.to_string())
                    .unwrap_or_default(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::Registration;
    use crate::domain::transaction::{Currency, TransactionStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_summaries() {
        let mut paid = Registration::new(1, 1, "", dec!(120.00), Currency::new("EUR").unwrap());
        paid.set_paid(true);
        let unpaid = Registration::new(1, 2, "", dec!(60), Currency::new("EUR").unwrap());

        let mut out = Vec::new();
        RegistrationWriter::new(&mut out)
            .write_summaries(vec![
                RegistrationSummary {
                    registration: paid,
                    status: Some(TransactionStatus::Successful),
                },
                RegistrationSummary {
                    registration: unpaid,
                    status: None,
                },
            ])
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output,
            "event,registrant,price,currency,paid,status\n\
             1,1,120,EUR,true,successful\n\
             1,2,60,EUR,false,\n"
        );
    }
}
