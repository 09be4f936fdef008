pub mod callback_reader;
pub mod ledger_writer;
pub mod registration_reader;
pub mod registration_writer;
