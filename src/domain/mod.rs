//! Domain model of registration payments: the ledger entries, the status machine
//! deciding how they follow each other, and the ports to the outside world.

pub mod notification;
pub mod plugins;
pub mod ports;
pub mod registration;
pub mod transaction;
pub mod transition;
