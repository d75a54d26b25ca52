//! SQLite database layer for grocery storage
//!
//! Single `grocery_items` table. Uses r2d2 connection pooling so snapshot reads
//! from the reminder job do not block writes from the UI.

use crate::models::StoredGrocery;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

const SELECT_COLUMNS: &str =
    "SELECT id, name, quantity, expiryDate, expectedDays, addedDate, reminderEnabled FROM grocery_items";

/// Thread-safe database wrapper using connection pooling
///
/// WAL mode lets readers proceed without blocking each other.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open or create a database at the given path with connection pooling
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| {
                conn.execute_batch("
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                ")?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let manager = SqliteConnectionManager::memory();

        // In-memory needs single connection to maintain state
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Get a connection from the pool
    fn get_conn(&self) -> DatabaseResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn setup_schema(&self) -> DatabaseResult<()> {
        let conn = self.get_conn()?;

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS grocery_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                quantity TEXT NOT NULL,
                expiryDate TEXT,
                expectedDays INTEGER,
                addedDate INTEGER NOT NULL,
                reminderEnabled INTEGER NOT NULL DEFAULT 1
            );
        "#)?;

        Ok(())
    }

    /// Get total number of groceries in the database
    pub fn count_groceries(&self) -> DatabaseResult<u64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM grocery_items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Insert a new grocery. Returns the assigned id.
    pub fn insert_grocery(&self, item: &StoredGrocery) -> DatabaseResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO grocery_items (name, quantity, expiryDate, expectedDays, addedDate, reminderEnabled)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                item.name,
                item.quantity,
                item.expiry_date,
                item.expected_duration_days,
                item.added_date_ms,
                item.reminder_enabled,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace the editable fields of a grocery. `addedDate` is never touched.
    /// Returns false when no row has that id.
    pub fn update_grocery(&self, id: i64, item: &StoredGrocery) -> DatabaseResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"UPDATE grocery_items
               SET name = ?1, quantity = ?2, expiryDate = ?3, expectedDays = ?4, reminderEnabled = ?5
               WHERE id = ?6"#,
            params![
                item.name,
                item.quantity,
                item.expiry_date,
                item.expected_duration_days,
                item.reminder_enabled,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a grocery by id. Returns false when no row has that id.
    pub fn delete_grocery(&self, id: i64) -> DatabaseResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM grocery_items WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Delete all groceries
    pub fn clear_all(&self) -> DatabaseResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM grocery_items", [])?;
        Ok(())
    }

    /// Fetch one grocery by id
    pub fn fetch_grocery(&self, id: i64) -> DatabaseResult<Option<StoredGrocery>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            [id],
            Self::row_to_grocery,
        );

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch every grocery in insertion order
    pub fn fetch_all_groceries(&self) -> DatabaseResult<Vec<StoredGrocery>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let items = stmt
            .query_map([], Self::row_to_grocery)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn row_to_grocery(row: &rusqlite::Row) -> rusqlite::Result<StoredGrocery> {
        Ok(StoredGrocery {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            quantity: row.get(2)?,
            expiry_date: row.get(3)?,
            expected_duration_days: row.get(4)?,
            added_date_ms: row.get(5)?,
            reminder_enabled: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grocery(name: &str) -> StoredGrocery {
        StoredGrocery {
            id: None,
            name: name.to_string(),
            quantity: "1".to_string(),
            expiry_date: Some("05/10/2024".to_string()),
            expected_duration_days: Some(4),
            added_date_ms: 1_700_000_000_000,
            reminder_enabled: true,
        }
    }

    #[test]
    fn test_insert_and_fetch() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_grocery(&grocery("Milk")).unwrap();
        assert!(id > 0);

        let fetched = db.fetch_grocery(id).unwrap().unwrap();
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.name, "Milk");
        assert_eq!(fetched.expiry_date.as_deref(), Some("05/10/2024"));
        assert_eq!(fetched.expected_duration_days, Some(4));
        assert_eq!(fetched.added_date_ms, 1_700_000_000_000);
        assert!(fetched.reminder_enabled);
    }

    #[test]
    fn test_optional_fields_round_trip_as_null() {
        let db = Database::open_in_memory().unwrap();
        let mut item = grocery("Salt");
        item.expiry_date = None;
        item.expected_duration_days = None;
        item.reminder_enabled = false;
        let id = db.insert_grocery(&item).unwrap();

        let fetched = db.fetch_grocery(id).unwrap().unwrap();
        assert_eq!(fetched.expiry_date, None);
        assert_eq!(fetched.expected_duration_days, None);
        assert!(!fetched.reminder_enabled);
    }

    #[test]
    fn test_ids_are_unique() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_grocery(&grocery("A")).unwrap();
        let b = db.insert_grocery(&grocery("B")).unwrap();
        assert_ne!(a, b);
        assert_eq!(db.count_groceries().unwrap(), 2);
    }

    #[test]
    fn test_update_keeps_added_date() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_grocery(&grocery("Milk")).unwrap();

        let mut replacement = grocery("Oat milk");
        replacement.added_date_ms = 42;
        replacement.expiry_date = None;
        assert!(db.update_grocery(id, &replacement).unwrap());

        let fetched = db.fetch_grocery(id).unwrap().unwrap();
        assert_eq!(fetched.name, "Oat milk");
        assert_eq!(fetched.expiry_date, None);
        assert_eq!(fetched.added_date_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_update_and_delete_missing_row() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.update_grocery(99, &grocery("Ghost")).unwrap());
        assert!(!db.delete_grocery(99).unwrap());
        assert!(db.fetch_grocery(99).unwrap().is_none());
    }

    #[test]
    fn test_delete_and_clear() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_grocery(&grocery("A")).unwrap();
        db.insert_grocery(&grocery("B")).unwrap();
        db.insert_grocery(&grocery("C")).unwrap();

        assert!(db.delete_grocery(a).unwrap());
        let names: Vec<String> = db.fetch_all_groceries().unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["B", "C"]);

        db.clear_all().unwrap();
        assert_eq!(db.count_groceries().unwrap(), 0);
    }
}
