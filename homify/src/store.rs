//! GroceryStore - Main API for the Android shell
//!
//! Wraps the SQLite record store and the reminder evaluator, designed for UniFFI export.
//!
//! Reminder job architecture:
//! The platform scheduler (or the CLI) calls `check_reminders` once a day. The
//! snapshot read and evaluation are blocking, so they run on tokio's blocking
//! pool; notifications are delivered from the async side once evaluation is done.

use crate::database::Database;
use crate::dates;
use crate::interface::{
    GroceryDraft, GroceryRecord, GroceryStoreApi, HomifyError, NotificationEvent, Notifier,
};
use crate::models::{sort_by_expiry, StoredGrocery};
use crate::reminders::ReminderEvaluator;
use chrono::NaiveDate;
use log::{debug, info};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;

/// Global fallback Tokio runtime for when async functions are called outside any runtime context.
/// This is shared across all GroceryStore instances and never dropped.
/// Used by UniFFI which doesn't provide a tokio runtime.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// Thread-safe grocery store backed by SQLite
///
/// Concurrency Model:
/// - Database uses r2d2 connection pool (concurrent reads, no mutex blocking)
/// - The reminder job runs its blocking work on tokio::spawn_blocking threads
/// - Uses global FALLBACK_RUNTIME when called outside any runtime (e.g., from UniFFI)
#[derive(uniffi::Object)]
pub struct GroceryStore {
    db: Arc<Database>,
}

// Internal implementation (not exported via FFI)
impl GroceryStore {
    /// Create a store with an in-memory database (for testing)
    #[cfg(test)]
    pub(crate) fn new_in_memory() -> Result<Self, HomifyError> {
        let database = Database::open_in_memory().map_err(HomifyError::from)?;
        Ok(Self { db: Arc::new(database) })
    }

    /// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
    fn runtime_handle(&self) -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }

    /// Read every record, soonest expiry first
    fn snapshot(db: &Database) -> Result<Vec<GroceryRecord>, HomifyError> {
        let mut records: Vec<GroceryRecord> = db
            .fetch_all_groceries()?
            .into_iter()
            .map(StoredGrocery::into_record)
            .collect();
        sort_by_expiry(&mut records);
        Ok(records)
    }

    /// Resolve an optional `dd/mm/yyyy` override to a calendar day
    fn resolve_today(today: Option<String>) -> Result<NaiveDate, HomifyError> {
        match today {
            None => Ok(ReminderEvaluator::local().today()),
            Some(raw) => dates::parse_date(raw.trim()).date().ok_or_else(|| {
                HomifyError::InvalidInput(format!("today must be dd/mm/yyyy, got {:?}", raw))
            }),
        }
    }

    /// Evaluate reminders for `today` without notifying
    pub fn evaluate_on(&self, today: NaiveDate) -> Result<Vec<NotificationEvent>, HomifyError> {
        let records = Self::snapshot(&self.db)?;
        Ok(ReminderEvaluator::local().evaluate(&records, today))
    }

    /// Snapshot + evaluate for `today` on the blocking pool
    pub async fn pending_reminders(&self, today: NaiveDate) -> Result<Vec<NotificationEvent>, HomifyError> {
        let db = Arc::clone(&self.db);

        let handle = self.runtime_handle().spawn_blocking(move || {
            let records = Self::snapshot(&db)?;
            info!("Running reminder check for {} items", records.len());
            Ok::<_, HomifyError>(ReminderEvaluator::local().evaluate(&records, today))
        });

        match handle.await {
            Ok(result) => result,
            Err(_join_error) => Err(HomifyError::Cancelled),
        }
    }

    /// Evaluate reminders for `today` and hand each one to `notifier`.
    /// Returns the events that were sent.
    pub async fn check_reminders_on(
        &self,
        notifier: Arc<dyn Notifier>,
        today: NaiveDate,
    ) -> Result<Vec<NotificationEvent>, HomifyError> {
        let events = self.pending_reminders(today).await?;

        for event in &events {
            notifier.notify(event.title.clone(), event.body.clone());
            debug!("Sent {} notification for {}", event.kind.as_str(), event.item_name);
        }

        info!("Reminder check finished, {} notification(s) sent", events.len());
        Ok(events)
    }
}

// FFI-exported constructor (must be in standalone impl block)
#[uniffi::export]
impl GroceryStore {
    /// Create a new store with a database at the given path
    #[uniffi::constructor]
    pub fn new(db_path: String) -> Result<Self, HomifyError> {
        let path = PathBuf::from(db_path);
        let db = Database::open(&path).map_err(HomifyError::from)?;
        Ok(Self { db: Arc::new(db) })
    }
}

// Reminder job (not on trait, so the foreign interface stays synchronous)
#[uniffi::export]
impl GroceryStore {
    /// The daily reminder job: evaluate against the device's today and notify.
    /// Returns the number of notifications sent.
    pub async fn check_reminders(&self, notifier: Arc<dyn Notifier>) -> Result<u64, HomifyError> {
        let today = ReminderEvaluator::local().today();
        let events = self.check_reminders_on(notifier, today).await?;
        Ok(events.len() as u64)
    }
}

#[uniffi::export]
impl GroceryStoreApi for GroceryStore {
    // ─────────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────────

    fn get_all(&self) -> Result<Vec<GroceryRecord>, HomifyError> {
        Self::snapshot(&self.db)
    }

    fn get(&self, item_id: i64) -> Result<Option<GroceryRecord>, HomifyError> {
        Ok(self.db.fetch_grocery(item_id)?.map(StoredGrocery::into_record))
    }

    fn count(&self) -> Result<u64, HomifyError> {
        Ok(self.db.count_groceries()?)
    }

    fn evaluate_reminders(&self, today: Option<String>) -> Result<Vec<NotificationEvent>, HomifyError> {
        let today = Self::resolve_today(today)?;
        self.evaluate_on(today)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validate, stamp the added date and insert. Nothing is written on invalid input.
    fn insert(&self, draft: GroceryDraft) -> Result<i64, HomifyError> {
        let item = StoredGrocery::from_draft(draft)?;
        let id = self.db.insert_grocery(&item)?;
        debug!("Inserted grocery {} ({})", id, item.name);
        Ok(id)
    }

    /// Validate and replace. The added date from creation is kept.
    fn update(&self, item_id: i64, draft: GroceryDraft) -> Result<(), HomifyError> {
        let item = StoredGrocery::from_draft(draft)?;
        if !self.db.update_grocery(item_id, &item)? {
            return Err(HomifyError::NotFound(item_id));
        }
        debug!("Updated grocery {} ({})", item_id, item.name);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Delete Operations
    // ─────────────────────────────────────────────────────────────────────────────

    fn delete(&self, item_id: i64) -> Result<(), HomifyError> {
        if !self.db.delete_grocery(item_id)? {
            return Err(HomifyError::NotFound(item_id));
        }
        debug!("Deleted grocery {}", item_id);
        Ok(())
    }

    fn clear(&self) -> Result<(), HomifyError> {
        self.db.clear_all()?;
        Ok(())
    }
}
