//! The payment transaction status machine.
//!
//! Given the status of the previous ledger entry (if any), the requested action and
//! whether the provider is the manual one, decides which status the next entry gets,
//! or why no entry should be written at all.

use super::transaction::{InvalidTransactionStatus, TransactionAction, TransactionStatus};
use std::fmt;

/// Coarse grouping of the previous status as seen by the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
    /// No previous transaction, or one that ended without money changing hands.
    Initial,
    Successful,
    Pending,
}

impl StatusGroup {
    pub fn of(status: Option<TransactionStatus>) -> Self {
        match status {
            None
            | Some(TransactionStatus::Cancelled)
            | Some(TransactionStatus::Failed)
            | Some(TransactionStatus::Rejected) => Self::Initial,
            Some(TransactionStatus::Successful) => Self::Successful,
            Some(TransactionStatus::Pending) => Self::Pending,
        }
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::Successful => "successful",
            Self::Pending => "pending",
        })
    }
}

/// Outcome of feeding an action to the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Persist a new transaction with this status.
    To(TransactionStatus),
    /// A non-manual provider completed an already successful payment.
    /// The new entry is still written, as successful.
    DoublePayment,
    /// Nothing changes; the action is redundant for the current status.
    Ignored,
    /// The action makes no sense for an online provider in the current status.
    InvalidAction,
    /// The action makes no sense for the manual provider in the current status.
    InvalidManualAction,
}

impl Transition {
    /// The status to persist, if this outcome persists anything.
    pub fn status(&self) -> Option<TransactionStatus> {
        match self {
            Self::To(status) => Some(*status),
            Self::DoublePayment => Some(TransactionStatus::Successful),
            Self::Ignored | Self::InvalidAction | Self::InvalidManualAction => None,
        }
    }

    pub fn is_double_payment(&self) -> bool {
        matches!(self, Self::DoublePayment)
    }
}

pub struct TransactionStatusTransition;

impl TransactionStatusTransition {
    pub fn next(
        previous: Option<TransactionStatus>,
        action: TransactionAction,
        manual: bool,
    ) -> Transition {
        match StatusGroup::of(previous) {
            StatusGroup::Initial => Self::next_from_initial(action, manual),
            StatusGroup::Successful => Self::next_from_successful(action, manual),
            StatusGroup::Pending => Self::next_from_pending(action, manual),
        }
    }

    /// Same as [`Self::next`], starting from a raw stored status code.
    pub fn next_from_code(
        previous: Option<u8>,
        action: TransactionAction,
        manual: bool,
    ) -> Result<Transition, InvalidTransactionStatus> {
        let previous = previous.map(TransactionStatus::try_from).transpose()?;
        Ok(Self::next(previous, action, manual))
    }

    fn next_from_initial(action: TransactionAction, manual: bool) -> Transition {
        use TransactionAction::*;
        if manual {
            match action {
                Complete => Transition::To(TransactionStatus::Successful),
                Cancel => Transition::Ignored,
                _ => Transition::InvalidManualAction,
            }
        } else {
            match action {
                Complete => Transition::To(TransactionStatus::Successful),
                Pending => Transition::To(TransactionStatus::Pending),
                Reject => Transition::Ignored,
                _ => Transition::InvalidAction,
            }
        }
    }

    fn next_from_successful(action: TransactionAction, manual: bool) -> Transition {
        use TransactionAction::*;
        if manual {
            match action {
                Complete => Transition::Ignored,
                Cancel => Transition::To(TransactionStatus::Cancelled),
                _ => Transition::InvalidManualAction,
            }
        } else {
            match action {
                Complete => Transition::DoublePayment,
                Pending | Reject => Transition::Ignored,
                _ => Transition::InvalidAction,
            }
        }
    }

    fn next_from_pending(action: TransactionAction, manual: bool) -> Transition {
        use TransactionAction::*;
        if manual {
            match action {
                Complete => Transition::Ignored,
                Cancel => Transition::To(TransactionStatus::Cancelled),
                _ => Transition::InvalidManualAction,
            }
        } else {
            match action {
                Complete => Transition::To(TransactionStatus::Successful),
                Pending => Transition::Ignored,
                Reject => Transition::To(TransactionStatus::Rejected),
                _ => Transition::InvalidAction,
            }
        }
    }
}
