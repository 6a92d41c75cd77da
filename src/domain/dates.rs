//! Calendar helpers: lenient date parsing and Saturday arithmetic.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};

/// Date-only layouts tried in order. Month-first wins over day-first for
/// ambiguous slash dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a calendar day from any of the tolerated layouts.
///
/// Returns `None` for empty or unrecognised input; callers decide whether
/// that drops the row. Timestamps are truncated to their date.
pub fn parse_date_lenient(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Most recent Saturday on or before `date`.
pub fn saturday_on_or_before(date: NaiveDate) -> NaiveDate {
    // Saturday is offset 5 from Monday; +2 mod 7 gives days since Saturday.
    let days_since = (date.weekday().num_days_from_monday() + 2) % 7;
    date - Days::new(u64::from(days_since))
}

pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

/// Every Saturday in the inclusive range `[start, end]`.
pub fn saturdays_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    let mut first = saturday_on_or_before(start);
    if first < start {
        first = first + Days::new(7);
    }
    first
        .iter_weeks()
        .take_while(|d| *d <= end)
        .collect()
}

/// Every calendar day in the inclusive range `[start, end]`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}
