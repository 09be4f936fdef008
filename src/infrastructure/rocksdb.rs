use crate::domain::ports::{RegistrationStore, TransactionStore};
use crate::domain::registration::Registration;
use crate::domain::transaction::{
    Amount, Currency, NewTransaction, PaymentTransaction, Provider, TransactionStatus,
};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing registrations.
pub const CF_REGISTRATIONS: &str = "registrations";
/// Column Family for the payment ledger, keyed by event, registrant and id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family indexing ledger entries by event, registrant and timestamp.
pub const CF_TIMESTAMPS: &str = "timestamps";
/// Column Family for counters.
pub const CF_META: &str = "meta";

const LAST_TRANSACTION_ID: &[u8] = b"last_transaction_id";

/// Ledger entry as written to disk. The status is kept as its integer code.
#[derive(Serialize, Deserialize)]
struct StoredTransaction {
    id: u64,
    event_id: u32,
    registrant_id: u32,
    status: u8,
    amount: Amount,
    currency: Currency,
    provider: Provider,
    timestamp: DateTime<Utc>,
    data: serde_json::Value,
}

impl From<&PaymentTransaction> for StoredTransaction {
    fn from(tx: &PaymentTransaction) -> Self {
        Self {
            id: tx.id,
            event_id: tx.event_id,
            registrant_id: tx.registrant_id,
            status: tx.status.into(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            provider: tx.provider.clone(),
            timestamp: tx.timestamp,
            data: tx.data.clone(),
        }
    }
}

impl TryFrom<StoredTransaction> for PaymentTransaction {
    type Error = PaymentError;

    fn try_from(stored: StoredTransaction) -> Result<Self> {
        Ok(Self {
            id: stored.id,
            event_id: stored.event_id,
            registrant_id: stored.registrant_id,
            status: TransactionStatus::try_from(stored.status)?,
            amount: stored.amount,
            currency: stored.currency,
            provider: stored.provider,
            timestamp: stored.timestamp,
            data: stored.data,
        })
    }
}

fn registrant_key(event_id: u32, registrant_id: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&event_id.to_be_bytes());
    key.extend_from_slice(&registrant_id.to_be_bytes());
    key
}

fn transaction_key(event_id: u32, registrant_id: u32, id: u64) -> Vec<u8> {
    let mut key = registrant_key(event_id, registrant_id);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn timestamp_key(event_id: u32, registrant_id: u32, timestamp: &DateTime<Utc>) -> Vec<u8> {
    // flip the sign bit so that pre-epoch timestamps still sort first
    let micros = (timestamp.timestamp_micros() as u64) ^ (1 << 63);
    let mut key = registrant_key(event_id, registrant_id);
    key.extend_from_slice(&micros.to_be_bytes());
    key
}

fn decode_transaction(bytes: &[u8]) -> Result<PaymentTransaction> {
    let stored: StoredTransaction = serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })?;
    stored.try_into()
}

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Registration` and `PaymentTransaction` entities using
/// separate Column Families. Ledger keys start with the event and registrant so a
/// registrant's history is one contiguous range.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    append_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_REGISTRATIONS, CF_TRANSACTIONS, CF_TIMESTAMPS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            append_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "Column family '{}' not found",
                name
            ))))
        })
    }

    fn last_transaction_id(&self) -> Result<u64> {
        let cf = self.cf(CF_META)?;
        match self.db.get_pinned_cf(cf, LAST_TRANSACTION_ID)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes[..].try_into().map_err(|_| {
                    PaymentError::InternalError(Box::new(std::io::Error::other(
                        "Corrupt transaction id counter",
                    )))
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    /// Writes raw bytes as a ledger entry, bypassing every check.
    #[cfg(test)]
    fn put_raw_transaction(&self, event_id: u32, registrant_id: u32, id: u64, value: &[u8]) {
        let cf = self.cf(CF_TRANSACTIONS).unwrap();
        self.db
            .put_cf(cf, transaction_key(event_id, registrant_id, id), value)
            .unwrap();
    }
}

#[async_trait]
impl RegistrationStore for RocksDBStore {
    async fn store(&self, registration: Registration) -> Result<()> {
        let cf = self.cf(CF_REGISTRATIONS)?;
        let key = registrant_key(registration.event_id, registration.registrant_id);
        let value = serde_json::to_vec(&registration)?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    async fn get(&self, event_id: u32, registrant_id: u32) -> Result<Option<Registration>> {
        let cf = self.cf(CF_REGISTRATIONS)?;
        match self.db.get_cf(cf, registrant_key(event_id, registrant_id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Registration>> {
        let cf = self.cf(CF_REGISTRATIONS)?;
        let mut registrations = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            registrations.push(serde_json::from_slice(&value)?);
        }
        Ok(registrations)
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn append(&self, tx: NewTransaction) -> Result<PaymentTransaction> {
        let _guard = self.append_lock.lock().await;
        let cf_transactions = self.cf(CF_TRANSACTIONS)?;
        let cf_timestamps = self.cf(CF_TIMESTAMPS)?;
        let cf_meta = self.cf(CF_META)?;

        let ts_key = timestamp_key(tx.event_id, tx.registrant_id, &tx.timestamp);
        if self.db.get_pinned_cf(cf_timestamps, &ts_key)?.is_some() {
            return Err(PaymentError::DuplicateTransaction {
                event: tx.event_id,
                registrant: tx.registrant_id,
                timestamp: tx.timestamp,
            });
        }

        let id = self.last_transaction_id()? + 1;
        let tx = PaymentTransaction::from_new(id, tx);
        let value = serde_json::to_vec(&StoredTransaction::from(&tx))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            cf_transactions,
            transaction_key(tx.event_id, tx.registrant_id, id),
            value,
        );
        batch.put_cf(cf_timestamps, ts_key, id.to_be_bytes());
        batch.put_cf(cf_meta, LAST_TRANSACTION_ID, id.to_be_bytes());
        self.db.write(batch)?;

        Ok(tx)
    }

    async fn latest(
        &self,
        event_id: u32,
        registrant_id: u32,
    ) -> Result<Option<PaymentTransaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let prefix = registrant_key(event_id, registrant_id);
        let upper = transaction_key(event_id, registrant_id, u64::MAX);

        let mut iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(upper.as_slice(), Direction::Reverse));
        match iter.next() {
            Some(item) => {
                let (key, value) = item?;
                if key.starts_with(&prefix) {
                    Ok(Some(decode_transaction(&value)?))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    async fn history(&self, event_id: u32, registrant_id: u32) -> Result<Vec<PaymentTransaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let prefix = registrant_key(event_id, registrant_id);

        let mut history = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix.as_slice(), Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            history.push(decode_transaction(&value)?);
        }
        Ok(history)
    }

    async fn all(&self) -> Result<Vec<PaymentTransaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let mut all = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            all.push(decode_transaction(&value)?);
        }
        all.sort_by_key(|tx| tx.id);
        Ok(all)
    }
}
