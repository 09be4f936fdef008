use super::callback::PaymentCallback;
use crate::domain::notification::Notification;
use crate::domain::plugins::PluginRegistry;
use crate::domain::ports::{NotifierBox, RegistrationStoreBox, TransactionStoreBox};
use crate::domain::registration::Registration;
use crate::domain::transaction::{
    Amount, NewTransaction, PaymentTransaction, TransactionStatus,
};
use crate::domain::transition::{StatusGroup, TransactionStatusTransition, Transition};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{error, info, warn};

/// A transaction that made it into the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTransaction {
    pub transaction: PaymentTransaction,
    /// Set when an online provider confirmed a payment that was already successful.
    pub double_payment: bool,
}

/// Final payment state of a registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationSummary {
    pub registration: Registration,
    /// Status of the latest ledger entry, if any.
    pub status: Option<TransactionStatus>,
}

/// The main entry point for registering payments.
///
/// `PaymentEngine` owns the storage backends and the notifier. Callbacks are handled
/// one at a time: every storage operation is awaited before the next callback starts,
/// which keeps each registrant's ledger in a consistent order.
pub struct PaymentEngine {
    registration_store: RegistrationStoreBox,
    transaction_store: TransactionStoreBox,
    notifier: NotifierBox,
    plugins: PluginRegistry,
    admins: Vec<String>,
}

impl PaymentEngine {
    /// Creates a new `PaymentEngine` instance accepting any payment provider.
    ///
    /// # Arguments
    ///
    /// * `registration_store` - The store for registrations.
    /// * `transaction_store` - The append-only payment ledger.
    /// * `notifier` - Where notifications go.
    pub fn new(
        registration_store: RegistrationStoreBox,
        transaction_store: TransactionStoreBox,
        notifier: NotifierBox,
    ) -> Self {
        Self {
            registration_store,
            transaction_store,
            notifier,
            plugins: PluginRegistry::permissive(),
            admins: Vec::new(),
        }
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    /// Recipients of double payment and amount mismatch notices.
    pub fn with_admins(mut self, admins: Vec<String>) -> Self {
        self.admins = admins;
        self
    }

    pub async fn add_registration(&self, registration: Registration) -> Result<()> {
        self.registration_store.store(registration).await
    }

    /// Stores a registration unless it is already known, in which case the stored
    /// one (and its payment state) wins. Returns whether it was stored.
    pub async fn import_registration(&self, registration: Registration) -> Result<bool> {
        let (event_id, registrant_id) = registration.key();
        if self
            .registration_store
            .get(event_id, registrant_id)
            .await?
            .is_some()
        {
            return Ok(false);
        }
        self.registration_store.store(registration).await?;
        Ok(true)
    }

    /// Runs a callback through the status machine and records the outcome.
    ///
    /// Returns `Ok(None)` when the callback does not lead to a new transaction: the
    /// action was ignored, was invalid for the current status, or the previous
    /// transaction has a corrupt status. Errors are reserved for bad input (unknown
    /// registration, amount, provider or currency), duplicate timestamps and storage
    /// failures. Notification failures are logged once the transaction is recorded.
    ///
    /// A double payment notifies the admins only; the registrant gets no second confirmation.
    pub async fn register_transaction(
        &self,
        callback: PaymentCallback,
    ) -> Result<Option<RegisteredTransaction>> {
        let event_id = callback.event_id;
        let registrant_id = callback.registrant_id;

        let mut registration = self
            .registration_store
            .get(event_id, registrant_id)
            .await?
            .ok_or(PaymentError::UnknownRegistration {
                event: event_id,
                registrant: registrant_id,
            })?;

        let amount = Amount::new(callback.amount.unwrap_or(registration.price))?;
        let currency = callback
            .currency
            .clone()
            .unwrap_or_else(|| registration.currency.clone());
        self.plugins.check(&callback.provider, event_id, &currency)?;

        let previous = match self.transaction_store.latest(event_id, registrant_id).await {
            Ok(previous) => previous,
            Err(PaymentError::InvalidTransactionStatus(e)) => {
                error!(
                    event_id,
                    registrant_id,
                    "{} (data received: {})",
                    e,
                    callback.data
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some((status, double_payment)) = next_status(previous.as_ref(), &callback) else {
            return Ok(None);
        };

        let timestamp = match callback.timestamp {
            Some(timestamp) => timestamp.trunc_subsecs(6),
            None => next_timestamp(previous.as_ref()),
        };

        let transaction = self
            .transaction_store
            .append(NewTransaction {
                event_id,
                registrant_id,
                status,
                amount,
                currency,
                provider: callback.provider,
                timestamp,
                data: callback.data,
            })
            .await?;

        info!(
            id = transaction.id,
            event_id,
            registrant_id,
            status = %transaction.status,
            provider = %transaction.provider,
            "Recorded payment transaction"
        );

        if double_payment {
            self.send(Notification::DoublePayment {
                event_id,
                registrant_id,
                amount: transaction.amount,
                currency: transaction.currency.clone(),
                provider: transaction.provider.clone(),
                recipients: self.admins.clone(),
            })
            .await;
        }

        match transaction.status {
            TransactionStatus::Successful => {
                registration.set_paid(true);
                self.registration_store.store(registration.clone()).await?;

                if !double_payment {
                    self.send(Notification::PaymentConfirmation {
                        event_id,
                        registrant_id,
                        email: registration.email.clone(),
                        amount: transaction.amount,
                        currency: transaction.currency.clone(),
                    })
                    .await;
                }

                if !registration.price_matches(transaction.amount, &transaction.currency) {
                    warn!(
                        event_id,
                        registrant_id,
                        expected = %registration.price,
                        received = %transaction.amount,
                        "Payment amount does not match the registration price"
                    );
                    self.send(Notification::AmountInconsistency {
                        event_id,
                        registrant_id,
                        expected: registration.price,
                        expected_currency: registration.currency.clone(),
                        received: transaction.amount,
                        currency: transaction.currency.clone(),
                        recipients: self.admins.clone(),
                    })
                    .await;
                }
            }
            TransactionStatus::Cancelled => {
                registration.set_paid(false);
                self.registration_store.store(registration).await?;
            }
            _ => {}
        }

        Ok(Some(RegisteredTransaction {
            transaction,
            double_payment,
        }))
    }

    /// Delivers a notification for a transaction that is already in the ledger.
    ///
    /// Delivery failures are logged and never undo or hide the recorded transaction.
    async fn send(&self, notification: Notification) {
        let subject = notification.subject();
        if let Err(e) = self.notifier.notify(notification).await {
            error!(subject = %subject, "Failed to send notification: {}", e);
        }
    }

    /// The ledger of one registrant, oldest first.
    pub async fn registration_history(
        &self,
        event_id: u32,
        registrant_id: u32,
    ) -> Result<Vec<PaymentTransaction>> {
        self.transaction_store.history(event_id, registrant_id).await
    }

    /// Every transaction recorded so far.
    pub async fn ledger(&self) -> Result<Vec<PaymentTransaction>> {
        self.transaction_store.all().await
    }

    /// Consumes the engine and returns the final state of all registrations.
    pub async fn into_results(self) -> Result<Vec<RegistrationSummary>> {
        let mut summaries = Vec::new();
        for registration in self.registration_store.get_all().await? {
            let status = self
                .transaction_store
                .latest(registration.event_id, registration.registrant_id)
                .await?
                .map(|tx| tx.status);
            summaries.push(RegistrationSummary {
                registration,
                status,
            });
        }
        summaries.sort_by_key(|summary| summary.registration.key());
        Ok(summaries)
    }
}

/// Decides the status of the next ledger entry, logging why when there is none.
///
/// The flag is set for double payments.
fn next_status(
    previous: Option<&PaymentTransaction>,
    callback: &PaymentCallback,
) -> Option<(TransactionStatus, bool)> {
    let from = previous.map(|tx| tx.status);
    let group = StatusGroup::of(from);
    let manual = callback.provider.is_manual();
    let event_id = callback.event_id;
    let registrant_id = callback.registrant_id;

    match TransactionStatusTransition::next(from, callback.action, manual) {
        Transition::To(status) => Some((status, false)),
        Transition::DoublePayment => {
            info!(
                event_id,
                registrant_id,
                provider = %callback.provider,
                "Received successful payment for an already paid registration"
            );
            Some((TransactionStatus::Successful, true))
        }
        Transition::Ignored => {
            warn!(
                event_id,
                registrant_id,
                "Ignored action '{}' on {} status (data received: {})",
                callback.action,
                group,
                callback.data
            );
            None
        }
        Transition::InvalidManualAction => {
            error!(
                event_id,
                registrant_id,
                "Invalid manual action '{}' on {} status (data received: {})",
                callback.action,
                group,
                callback.data
            );
            None
        }
        Transition::InvalidAction => {
            error!(
                event_id,
                registrant_id,
                provider = %callback.provider,
                "Invalid action '{}' on {} status (data received: {})",
                callback.action,
                group,
                callback.data
            );
            None
        }
    }
}

/// Current time at microsecond precision, strictly after the previous entry.
fn next_timestamp(previous: Option<&PaymentTransaction>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(tx) if tx.timestamp >= now => tx.timestamp + Duration::microseconds(1),
        _ => now,
    }
}
