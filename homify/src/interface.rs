//! Homify FFI Interface Definition
//!
//! This file defines the public interface exposed to the Android shell via UniFFI.
//! It acts as the source of truth for shared types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a grocery item warrants a notification today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    ExpiringToday,
    ExpiringTomorrow,
    LikelyFinishedToday,
    LikelyFinishesTomorrow,
}

impl ReminderKind {
    /// Stable identifier, used in dedupe keys and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::ExpiringToday => "expiring_today",
            ReminderKind::ExpiringTomorrow => "expiring_tomorrow",
            ReminderKind::LikelyFinishedToday => "likely_finished_today",
            ReminderKind::LikelyFinishesTomorrow => "likely_finishes_tomorrow",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A grocery item as held by the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct GroceryRecord {
    /// Assigned by the store on creation, never changes
    pub id: i64,
    pub name: String,
    pub quantity: String,
    /// `dd/mm/yyyy`, kept verbatim even when it does not parse
    pub expiry_date: Option<String>,
    /// Days the item is expected to last, counted from `added_date_ms`
    pub expected_duration_days: Option<i64>,
    /// Milliseconds since the Unix epoch, stamped once on creation
    pub added_date_ms: i64,
    pub reminder_enabled: bool,
}

/// User input for creating or replacing a grocery record.
/// Checked by `GroceryDraft::validate` before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct GroceryDraft {
    pub name: String,
    pub quantity: String,
    pub expiry_date: Option<String>,
    pub expected_duration_days: Option<i64>,
    pub reminder_enabled: bool,
}

/// A reminder produced by one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct NotificationEvent {
    pub item_name: String,
    pub kind: ReminderKind,
    pub title: String,
    pub body: String,
}

/// Error type for Homify operations
#[derive(Debug, Error, uniffi::Error)]
pub enum HomifyError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No grocery item with id {0}")]
    NotFound(i64),
    #[error("Operation cancelled")]
    Cancelled,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// The primary interface for accessing the grocery record store.
/// This matches the functionality exposed by the `GroceryStore` object.
#[uniffi::export(with_foreign)]
pub trait GroceryStoreApi: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Snapshot of every record, soonest expiry first
    fn get_all(&self) -> Result<Vec<GroceryRecord>, HomifyError>;

    /// Fetch a single record
    fn get(&self, item_id: i64) -> Result<Option<GroceryRecord>, HomifyError>;

    /// Number of stored records
    fn count(&self) -> Result<u64, HomifyError>;

    /// Evaluate reminders against the current snapshot without notifying.
    /// `today` overrides the device date (`dd/mm/yyyy`).
    fn evaluate_reminders(&self, today: Option<String>) -> Result<Vec<NotificationEvent>, HomifyError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validate and insert a new record. Returns the new id.
    fn insert(&self, draft: GroceryDraft) -> Result<i64, HomifyError>;

    /// Validate and replace every field of an existing record except id and added date
    fn update(&self, item_id: i64, draft: GroceryDraft) -> Result<(), HomifyError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Delete Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Delete a record by id
    fn delete(&self, item_id: i64) -> Result<(), HomifyError>;

    /// Delete every record
    fn clear(&self) -> Result<(), HomifyError>;
}

/// Delivers reminder notifications. Implemented by the platform shell
/// (Android notification channel) or by the CLI.
#[uniffi::export(with_foreign)]
pub trait Notifier: Send + Sync {
    fn notify(&self, title: String, body: String);
}

impl From<crate::database::DatabaseError> for HomifyError {
    fn from(e: crate::database::DatabaseError) -> Self {
        HomifyError::DatabaseError(e.to_string())
    }
}
