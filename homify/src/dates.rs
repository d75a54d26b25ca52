//! Calendar dates at the record boundary
//!
//! Expiry dates are exchanged as `dd/mm/yyyy` strings: two-digit day and month,
//! four-digit year, `/` separators. Anything else is `Unparseable`, which the
//! reminder logic treats as "no expiry check" rather than an error.

use chrono::{NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// chrono format string for the boundary layout
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Human-facing layout used by list display ("5 Oct 2024")
const DISPLAY_FORMAT: &str = "%-d %b %Y";

/// Exact boundary layout. chrono alone accepts unpadded fields, so the shape is
/// checked first and chrono only validates the calendar.
static DATE_LAYOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").unwrap()
});

/// Result of reading a boundary date string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed(NaiveDate),
    Unparseable,
}

impl ParsedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Parsed(date) => Some(date),
            ParsedDate::Unparseable => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedDate::Parsed(_))
    }
}

/// Parse a `dd/mm/yyyy` string. Out-of-range fields (`31/13/2024`, `30/02/2024`)
/// are `Unparseable`; no rollover into neighbouring months.
pub fn parse_date(text: &str) -> ParsedDate {
    match parse_fields(text) {
        Some(date) => ParsedDate::Parsed(date),
        None => ParsedDate::Unparseable,
    }
}

fn parse_fields(text: &str) -> Option<NaiveDate> {
    let caps = DATE_LAYOUT.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date in the boundary layout
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a date for list display
pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Calendar day an epoch-millis timestamp falls on in `tz`.
/// `None` when the timestamp is outside chrono's range.
pub fn day_of_millis<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
}

/// Today's calendar day in `tz`, read from the system clock once
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Current time as epoch millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Epoch millis of UTC midnight at the start of `date`
pub fn midnight_millis_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight).timestamp_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_valid_dates() {
        assert_eq!(parse_date("05/10/2024"), ParsedDate::Parsed(ymd(2024, 10, 5)));
        assert_eq!(parse_date("29/02/2024"), ParsedDate::Parsed(ymd(2024, 2, 29)));
        assert_eq!(parse_date("31/12/0999"), ParsedDate::Parsed(ymd(999, 12, 31)));
    }

    #[test]
    fn test_parse_rejects_invalid_calendar_dates() {
        assert_eq!(parse_date("31/13/2024"), ParsedDate::Unparseable);
        assert_eq!(parse_date("30/02/2024"), ParsedDate::Unparseable);
        assert_eq!(parse_date("29/02/2023"), ParsedDate::Unparseable);
        assert_eq!(parse_date("00/01/2024"), ParsedDate::Unparseable);
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        assert!(!parse_date("1/2/2024").is_parsed());
        assert!(!parse_date("2024-01-02").is_parsed());
        assert!(!parse_date("01/02/24").is_parsed());
        assert!(!parse_date(" 01/02/2024").is_parsed());
        assert!(!parse_date("").is_parsed());
        assert!(!parse_date("tomorrow").is_parsed());
    }

    #[test]
    fn test_format_round_trips() {
        for raw in ["01/01/2000", "29/02/2024", "31/12/1999", "07/03/0042"] {
            let date = parse_date(raw).date().unwrap();
            assert_eq!(format_date(date), raw);
        }
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_display(ymd(2024, 10, 5)), "5 Oct 2024");
    }

    #[test]
    fn test_days_between() {
        let today = ymd(2024, 3, 1);
        assert_eq!(days_between(today, ymd(2024, 3, 1)), 0);
        assert_eq!(days_between(today, ymd(2024, 3, 2)), 1);
        assert_eq!(days_between(today, ymd(2024, 2, 29)), -1);
        assert_eq!(days_between(ymd(2023, 12, 31), ymd(2024, 12, 31)), 366);
    }

    #[test]
    fn test_day_of_millis_respects_time_zone() {
        // 2024-03-01T23:30:00Z
        let millis = midnight_millis_utc(ymd(2024, 3, 1)) + (23 * 60 + 30) * 60 * 1000;
        assert_eq!(day_of_millis(millis, &Utc), Some(ymd(2024, 3, 1)));

        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(day_of_millis(millis, &east), Some(ymd(2024, 3, 2)));
    }

    #[test]
    fn test_day_of_millis_out_of_range() {
        assert_eq!(day_of_millis(i64::MAX, &Utc), None);
    }
}
