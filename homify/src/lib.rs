//! Homify Core - Rust business logic for the Homify grocery tracker
//!
//! This library holds the grocery record store (SQLite) and the daily
//! expiry/consumption reminder computation for the Homify Android app.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

pub mod config;
pub mod database;
pub mod dates;
pub mod interface;
pub mod models;
pub mod reminders;
mod store;

pub use interface::*;
pub use reminders::ReminderEvaluator;
pub use store::GroceryStore;

uniffi::setup_scaffolding!("homify");
