#![allow(dead_code)]

use rand::Rng;
use rand::seq::SliceRandom;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const REGISTRATIONS_HEADER: &str = "event, registrant, email, price, currency";
pub const CALLBACKS_HEADER: &str = "event,registrant,action,provider,amount,currency,timestamp,data";

/// Writes a header and rows to a fresh temporary CSV file.
pub fn write_csv(header: &str, rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", header)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}

pub fn registrations(rows: &[&str]) -> NamedTempFile {
    write_csv(REGISTRATIONS_HEADER, rows).expect("Failed to write registrations")
}

pub fn callbacks(rows: &[&str]) -> NamedTempFile {
    write_csv(CALLBACKS_HEADER, rows).expect("Failed to write callbacks")
}

/// One random callback row: (action, provider).
pub fn random_callback<R: Rng>(rng: &mut R) -> (&'static str, &'static str) {
    let action = *["complete", "cancel", "pending", "reject"]
        .choose(rng)
        .expect("non-empty");
    let provider = if rng.gen_bool(0.3) { "_manual" } else { "paypal" };
    (action, provider)
}
