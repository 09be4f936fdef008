//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `PaymentEngine` which acts as the primary entry point
//! for registering payment callbacks. It runs each callback through the status
//! machine and applies the resulting side effects on registrations and notifications.

pub mod callback;
pub mod engine;
