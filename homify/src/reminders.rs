//! Expiry and consumption reminders
//!
//! `ReminderEvaluator::evaluate` is a pure function of a record snapshot and a
//! calendar day. It never touches storage or the clock, so running it twice with
//! the same input yields the same events.
//!
//! Per record, two independent checks can fire:
//! - expiry: `expiry_date - today` is 0 or 1 day
//! - consumption: `day(added_date) + expected_duration_days - today` is 0 or 1 day
//!
//! A check that cannot be computed (unparseable expiry, out-of-range timestamp)
//! is logged and skipped for that record only.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use log::{debug, warn};

use crate::dates::{self, ParsedDate};
use crate::interface::{GroceryRecord, NotificationEvent, ReminderKind};
use crate::models::usage_end;

impl ReminderKind {
    /// Expiry classification; only today and tomorrow warrant a reminder
    pub fn for_expiry(days_left: i64) -> Option<Self> {
        match days_left {
            0 => Some(ReminderKind::ExpiringToday),
            1 => Some(ReminderKind::ExpiringTomorrow),
            _ => None,
        }
    }

    /// Consumption classification; only today and tomorrow warrant a reminder
    pub fn for_consumption(days_left: i64) -> Option<Self> {
        match days_left {
            0 => Some(ReminderKind::LikelyFinishedToday),
            1 => Some(ReminderKind::LikelyFinishesTomorrow),
            _ => None,
        }
    }

    pub fn title(&self, name: &str) -> String {
        match self {
            ReminderKind::ExpiringToday => format!("⚠️ {} expiring today", name),
            ReminderKind::ExpiringTomorrow => format!("⚠️ {} expiring tomorrow", name),
            ReminderKind::LikelyFinishedToday => format!("🍶 {} may finish today", name),
            ReminderKind::LikelyFinishesTomorrow => format!("🍶 {} may finish tomorrow", name),
        }
    }

    pub fn body(&self, name: &str) -> String {
        match self {
            ReminderKind::ExpiringToday => {
                format!("{} expires today. Use or replace it soon!", name)
            }
            ReminderKind::ExpiringTomorrow => {
                format!("{} will expire tomorrow. Consider restocking.", name)
            }
            ReminderKind::LikelyFinishedToday => {
                format!("You likely finish {} today. Consider restocking.", name)
            }
            ReminderKind::LikelyFinishesTomorrow => {
                format!("You likely finish {} tomorrow. Consider buying another.", name)
            }
        }
    }
}

impl NotificationEvent {
    pub fn new(item_name: &str, kind: ReminderKind) -> Self {
        Self {
            item_name: item_name.to_string(),
            kind,
            title: kind.title(item_name),
            body: kind.body(item_name),
        }
    }

    /// Key for suppressing repeats of the same reminder on the same day
    pub fn dedupe_key(&self, today: NaiveDate) -> String {
        format!("{}|{}|{}", dates::format_date(today), self.item_name, self.kind.as_str())
    }
}

/// Decides which records warrant a notification on a given day.
///
/// `tz` turns `added_date_ms` into a calendar day; expiry dates and `today`
/// are already calendar days.
#[derive(Debug, Clone)]
pub struct ReminderEvaluator<Tz: TimeZone> {
    tz: Tz,
}

impl ReminderEvaluator<Local> {
    /// Evaluator for the device's time zone
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl ReminderEvaluator<Utc> {
    pub fn utc() -> Self {
        Self::new(Utc)
    }
}

impl<Tz: TimeZone> ReminderEvaluator<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Today's calendar day in this evaluator's time zone.
    /// Read once per pass and pass the value to `evaluate`.
    pub fn today(&self) -> NaiveDate {
        dates::today_in(&self.tz)
    }

    /// Evaluate every record against `today`. Records are visited in input
    /// order; a record's expiry event precedes its consumption event.
    pub fn evaluate(&self, records: &[GroceryRecord], today: NaiveDate) -> Vec<NotificationEvent> {
        let mut events = Vec::new();

        for record in records {
            if !record.reminder_enabled {
                debug!("Skipping {} - reminders disabled", record.name);
                continue;
            }

            if let Some(kind) = self.expiry_check(record, today) {
                debug!("Expiry reminder for {}: {:?}", record.name, kind);
                events.push(NotificationEvent::new(&record.name, kind));
            }

            if let Some(kind) = self.consumption_check(record, today) {
                debug!("Consumption reminder for {}: {:?}", record.name, kind);
                events.push(NotificationEvent::new(&record.name, kind));
            }
        }

        events
    }

    fn expiry_check(&self, record: &GroceryRecord, today: NaiveDate) -> Option<ReminderKind> {
        let raw = record.expiry_date.as_deref()?;
        let expiry = match dates::parse_date(raw) {
            ParsedDate::Parsed(date) => date,
            ParsedDate::Unparseable => {
                warn!("Failed to parse expiry for {}: {:?}", record.name, raw);
                return None;
            }
        };

        let days_left = dates::days_between(today, expiry);
        debug!("{} expiry in {} day(s) (expiry={})", record.name, days_left, raw);
        ReminderKind::for_expiry(days_left)
    }

    fn consumption_check(&self, record: &GroceryRecord, today: NaiveDate) -> Option<ReminderKind> {
        let expected_days = record.expected_duration_days?;
        let Some(end) = usage_end(record.added_date_ms, expected_days, &self.tz) else {
            warn!(
                "Failed to compute expected usage for {} (added={}ms, expected_days={})",
                record.name, record.added_date_ms, expected_days
            );
            return None;
        };

        let days_left = dates::days_between(today, end);
        debug!(
            "{} expected to finish in {} day(s) (expected_days={})",
            record.name, days_left, expected_days
        );
        ReminderKind::for_consumption(days_left)
    }
}
