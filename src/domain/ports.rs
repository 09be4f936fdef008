use super::notification::Notification;
use super::registration::Registration;
use super::transaction::{NewTransaction, PaymentTransaction};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn store(&self, registration: Registration) -> Result<()>;
    async fn get(&self, event_id: u32, registrant_id: u32) -> Result<Option<Registration>>;
    async fn get_all(&self) -> Result<Vec<Registration>>;
}

/// Append-only payment ledger.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Appends a transaction, assigning its id.
    ///
    /// Fails with `DuplicateTransaction` if the registrant already has an entry with
    /// the same timestamp.
    async fn append(&self, tx: NewTransaction) -> Result<PaymentTransaction>;
    /// The most recently appended transaction of a registrant.
    async fn latest(&self, event_id: u32, registrant_id: u32)
    -> Result<Option<PaymentTransaction>>;
    /// All transactions of a registrant, oldest first.
    async fn history(&self, event_id: u32, registrant_id: u32) -> Result<Vec<PaymentTransaction>>;
    /// Every transaction in the ledger, ordered by id.
    async fn all(&self) -> Result<Vec<PaymentTransaction>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

pub type RegistrationStoreBox = Box<dyn RegistrationStore>;
pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type NotifierBox = Box<dyn Notifier>;
