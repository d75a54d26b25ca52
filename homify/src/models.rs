//! Core data models for Homify
//!
//! `StoredGrocery` is the storage-side row; `GroceryRecord` (interface.rs) is what
//! crosses the FFI boundary.

use std::cmp::Ordering;

use chrono::{Days, NaiveDate, TimeZone};

use crate::dates::{self, ParsedDate};
use crate::interface::{GroceryDraft, GroceryRecord, HomifyError};

// ─────────────────────────────────────────────────────────────────────────────
// INTERNAL ITEM (not exposed via FFI, used for storage)
// ─────────────────────────────────────────────────────────────────────────────

/// Internal grocery representation for database storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGrocery {
    pub id: Option<i64>,
    pub name: String,
    pub quantity: String,
    pub expiry_date: Option<String>,
    pub expected_duration_days: Option<i64>,
    pub added_date_ms: i64,
    pub reminder_enabled: bool,
}

impl StoredGrocery {
    /// Validate a draft and stamp it with the current time
    pub fn from_draft(draft: GroceryDraft) -> Result<Self, HomifyError> {
        Self::from_draft_at(draft, dates::now_millis())
    }

    /// Validate a draft with an explicit creation time
    pub fn from_draft_at(draft: GroceryDraft, added_date_ms: i64) -> Result<Self, HomifyError> {
        let draft = draft.validate()?;
        Ok(Self {
            id: None,
            name: draft.name,
            quantity: draft.quantity,
            expiry_date: draft.expiry_date,
            expected_duration_days: draft.expected_duration_days,
            added_date_ms,
            reminder_enabled: draft.reminder_enabled,
        })
    }

    /// Convert to the FFI record. Rows always carry an id once read back.
    pub fn into_record(self) -> GroceryRecord {
        GroceryRecord {
            id: self.id.unwrap_or_default(),
            name: self.name,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
            expected_duration_days: self.expected_duration_days,
            added_date_ms: self.added_date_ms,
            reminder_enabled: self.reminder_enabled,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DRAFT VALIDATION
// ─────────────────────────────────────────────────────────────────────────────

impl GroceryDraft {
    /// Draft with the two required fields; reminders on, nothing else tracked
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            expiry_date: None,
            expected_duration_days: None,
            reminder_enabled: true,
        }
    }

    pub fn with_expiry(mut self, expiry_date: impl Into<String>) -> Self {
        self.expiry_date = Some(expiry_date.into());
        self
    }

    pub fn with_expected_days(mut self, days: i64) -> Self {
        self.expected_duration_days = Some(days);
        self
    }

    pub fn with_reminder(mut self, enabled: bool) -> Self {
        self.reminder_enabled = enabled;
        self
    }

    /// Trim text fields and check invariants.
    ///
    /// A blank expiry becomes `None`. An expiry that does not parse is kept as
    /// typed: display shows it verbatim and the reminder check skips it.
    pub fn validate(self) -> Result<Self, HomifyError> {
        let name = self.name.trim().to_string();
        let quantity = self.quantity.trim().to_string();

        if name.is_empty() {
            return Err(HomifyError::InvalidInput("name must not be empty".to_string()));
        }
        if quantity.is_empty() {
            return Err(HomifyError::InvalidInput("quantity must not be empty".to_string()));
        }
        if let Some(days) = self.expected_duration_days {
            if days < 0 {
                return Err(HomifyError::InvalidInput(format!(
                    "expected duration must be zero or more days, got {}",
                    days
                )));
            }
        }

        let expiry_date = self
            .expiry_date
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());

        Ok(Self {
            name,
            quantity,
            expiry_date,
            expected_duration_days: self.expected_duration_days,
            reminder_enabled: self.reminder_enabled,
        })
    }
}

impl GroceryRecord {
    /// Parsed expiry date, if present and well-formed
    pub fn parsed_expiry(&self) -> Option<ParsedDate> {
        self.expiry_date.as_deref().map(dates::parse_date)
    }

    /// Draft carrying this record's editable fields
    pub fn to_draft(&self) -> GroceryDraft {
        GroceryDraft {
            name: self.name.clone(),
            quantity: self.quantity.clone(),
            expiry_date: self.expiry_date.clone(),
            expected_duration_days: self.expected_duration_days,
            reminder_enabled: self.reminder_enabled,
        }
    }
}

/// Snapshot order: parsed expiry ascending, then records with no usable expiry;
/// ties broken by id.
pub fn sort_by_expiry(records: &mut [GroceryRecord]) {
    records.sort_by(|a, b| {
        let a_date = a.parsed_expiry().and_then(ParsedDate::date);
        let b_date = b.parsed_expiry().and_then(ParsedDate::date);
        let by_date = match (a_date, b_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then(a.id.cmp(&b.id))
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// DISPLAY HELPERS
// ─────────────────────────────────────────────────────────────────────────────

/// Where an item stands against its expected consumption window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionStatus {
    Finished,
    FinishesToday,
    FinishesTomorrow,
    FinishesIn(i64),
}

impl ConsumptionStatus {
    /// Status for a record on `today`, or `None` when no duration is tracked
    /// (or the window cannot be computed).
    pub fn for_record<Tz: TimeZone>(
        record: &GroceryRecord,
        today: NaiveDate,
        tz: &Tz,
    ) -> Option<Self> {
        let usage_end = usage_end(record.added_date_ms, record.expected_duration_days?, tz)?;
        Some(Self::from_days_left(dates::days_between(today, usage_end)))
    }

    pub fn from_days_left(days_left: i64) -> Self {
        match days_left {
            d if d < 0 => ConsumptionStatus::Finished,
            0 => ConsumptionStatus::FinishesToday,
            1 => ConsumptionStatus::FinishesTomorrow,
            d => ConsumptionStatus::FinishesIn(d),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ConsumptionStatus::Finished => "Likely finished".to_string(),
            ConsumptionStatus::FinishesToday => "Finishes today".to_string(),
            ConsumptionStatus::FinishesTomorrow => "Finishes tomorrow".to_string(),
            ConsumptionStatus::FinishesIn(days) => format!("Finishes in: {}d", days),
        }
    }
}

/// Day the item is expected to run out: the calendar day of `added_date_ms`
/// plus `expected_days`. `None` for negative durations, out-of-range
/// timestamps or date overflow.
pub fn usage_end<Tz: TimeZone>(added_date_ms: i64, expected_days: i64, tz: &Tz) -> Option<NaiveDate> {
    let days = u64::try_from(expected_days).ok()?;
    dates::day_of_millis(added_date_ms, tz)?.checked_add_days(Days::new(days))
}

/// Expiry text for list display: formatted when parseable, verbatim otherwise
pub fn display_expiry(raw: &str) -> String {
    match dates::parse_date(raw) {
        ParsedDate::Parsed(date) => format!("Expires: {}", dates::format_display(date)),
        ParsedDate::Unparseable => format!("Expires: {}", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, expiry: Option<&str>) -> GroceryRecord {
        GroceryRecord {
            id,
            name: format!("item-{}", id),
            quantity: "1".to_string(),
            expiry_date: expiry.map(str::to_string),
            expected_duration_days: None,
            added_date_ms: 0,
            reminder_enabled: true,
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let draft = GroceryDraft::new("  Milk ", " 2 L ").with_expiry("  05/10/2024 ");
        let valid = draft.validate().unwrap();
        assert_eq!(valid.name, "Milk");
        assert_eq!(valid.quantity, "2 L");
        assert_eq!(valid.expiry_date.as_deref(), Some("05/10/2024"));
    }

    #[test]
    fn test_validate_blank_expiry_becomes_none() {
        let valid = GroceryDraft::new("Milk", "1").with_expiry("   ").validate().unwrap();
        assert_eq!(valid.expiry_date, None);
    }

    #[test]
    fn test_validate_keeps_unparseable_expiry() {
        let valid = GroceryDraft::new("Milk", "1").with_expiry("31/13/2024").validate().unwrap();
        assert_eq!(valid.expiry_date.as_deref(), Some("31/13/2024"));
    }

    #[test]
    fn test_validate_rejects_empty_required_fields() {
        assert!(matches!(
            GroceryDraft::new("  ", "1").validate(),
            Err(HomifyError::InvalidInput(_))
        ));
        assert!(matches!(
            GroceryDraft::new("Milk", "").validate(),
            Err(HomifyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_duration() {
        let result = GroceryDraft::new("Milk", "1").with_expected_days(-1).validate();
        assert!(matches!(result, Err(HomifyError::InvalidInput(_))));

        let zero = GroceryDraft::new("Milk", "1").with_expected_days(0).validate().unwrap();
        assert_eq!(zero.expected_duration_days, Some(0));
    }

    #[test]
    fn test_from_draft_at_stamps_added_date() {
        let stored = StoredGrocery::from_draft_at(GroceryDraft::new("Eggs", "12"), 1_700_000_000_000).unwrap();
        assert_eq!(stored.id, None);
        assert_eq!(stored.added_date_ms, 1_700_000_000_000);
        assert!(stored.reminder_enabled);
    }

    #[test]
    fn test_sort_by_expiry_puts_unusable_last() {
        let mut records = vec![
            record(1, None),
            record(2, Some("10/01/2025")),
            record(3, Some("garbage")),
            record(4, Some("02/01/2025")),
            record(5, Some("10/01/2025")),
        ];
        sort_by_expiry(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 2, 5, 1, 3]);
    }

    #[test]
    fn test_consumption_status_labels() {
        assert_eq!(ConsumptionStatus::from_days_left(-3).label(), "Likely finished");
        assert_eq!(ConsumptionStatus::from_days_left(0).label(), "Finishes today");
        assert_eq!(ConsumptionStatus::from_days_left(1).label(), "Finishes tomorrow");
        assert_eq!(ConsumptionStatus::from_days_left(4).label(), "Finishes in: 4d");
    }

    #[test]
    fn test_consumption_status_for_record() {
        let today = ymd(2024, 6, 10);
        let mut milk = record(1, None);
        milk.added_date_ms = dates::midnight_millis_utc(ymd(2024, 6, 5));
        assert_eq!(ConsumptionStatus::for_record(&milk, today, &Utc), None);

        milk.expected_duration_days = Some(5);
        assert_eq!(
            ConsumptionStatus::for_record(&milk, today, &Utc),
            Some(ConsumptionStatus::FinishesToday)
        );

        milk.expected_duration_days = Some(3);
        assert_eq!(
            ConsumptionStatus::for_record(&milk, today, &Utc),
            Some(ConsumptionStatus::Finished)
        );
    }

    #[test]
    fn test_usage_end_rejects_negative_days() {
        assert_eq!(usage_end(0, -1, &Utc), None);
        assert_eq!(usage_end(0, 2, &Utc), Some(ymd(1970, 1, 3)));
    }

    #[test]
    fn test_display_expiry() {
        assert_eq!(display_expiry("05/10/2024"), "Expires: 5 Oct 2024");
        assert_eq!(display_expiry("next week"), "Expires: next week");
    }
}
