use crate::domain::transaction::PaymentTransaction;
use crate::error::Result;
use chrono::SecondsFormat;
use std::io::Write;

/// Dumps ledger entries as CSV, one row per transaction.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_transactions(&mut self, transactions: &[PaymentTransaction]) -> Result<()> {
        self.writer.write_record([
            "id",
            "event",
            "registrant",
            "timestamp",
            "status",
            "amount",
            "currency",
            "provider",
            "data",
        ])?;
        for tx in transactions {
            let data = if tx.data.is_null() {
                String::new()
            } else {
                tx.data.to_string()
            };
            self.writer.write_record([
                tx.id.to_string(),
                tx.event_id.to_string(),
                tx.registrant_id.to_string(),
                tx.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                tx.status.to_string(),
                tx.amount.to_string(),
                tx.currency.to_string(),
                tx.provider.to_string(),
                data,
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
