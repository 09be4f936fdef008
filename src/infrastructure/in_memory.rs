use crate::domain::ports::{RegistrationStore, TransactionStore};
use crate::domain::registration::Registration;
use crate::domain::transaction::{NewTransaction, PaymentTransaction};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for registrations.
///
/// Uses `Arc<RwLock<HashMap<(u32, u32), Registration>>>` to allow shared concurrent access.
/// Ideal for testing or small datasets where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryRegistrationStore {
    registrations: Arc<RwLock<HashMap<(u32, u32), Registration>>>,
}

impl InMemoryRegistrationStore {
    /// Creates a new, empty in-memory registration store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn store(&self, registration: Registration) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        registrations.insert(registration.key(), registration);
        Ok(())
    }

    async fn get(&self, event_id: u32, registrant_id: u32) -> Result<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.get(&(event_id, registrant_id)).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.values().cloned().collect())
    }
}

/// A thread-safe in-memory payment ledger.
///
/// Entries are grouped per `(event, registrant)` in append order.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    ledgers: Arc<RwLock<HashMap<(u32, u32), Vec<PaymentTransaction>>>>,
    last_id: Arc<AtomicU64>,
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn append(&self, tx: NewTransaction) -> Result<PaymentTransaction> {
        let mut ledgers = self.ledgers.write().await;
        let ledger = ledgers.entry((tx.event_id, tx.registrant_id)).or_default();

        if ledger.iter().any(|existing| existing.timestamp == tx.timestamp) {
            return Err(PaymentError::DuplicateTransaction {
                event: tx.event_id,
                registrant: tx.registrant_id,
                timestamp: tx.timestamp,
            });
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = PaymentTransaction::from_new(id, tx);
        ledger.push(tx.clone());
        Ok(tx)
    }

    async fn latest(
        &self,
        event_id: u32,
        registrant_id: u32,
    ) -> Result<Option<PaymentTransaction>> {
        let ledgers = self.ledgers.read().await;
        Ok(ledgers
            .get(&(event_id, registrant_id))
            .and_then(|ledger| ledger.last())
            .cloned())
    }

    async fn history(&self, event_id: u32, registrant_id: u32) -> Result<Vec<PaymentTransaction>> {
        let ledgers = self.ledgers.read().await;
        Ok(ledgers
            .get(&(event_id, registrant_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn all(&self) -> Result<Vec<PaymentTransaction>> {
        let ledgers = self.ledgers.read().await;
        let mut all: Vec<_> = ledgers.values().flatten().cloned().collect();
        all.sort_by_key(|tx| tx.id);
        Ok(all)
    }
}
