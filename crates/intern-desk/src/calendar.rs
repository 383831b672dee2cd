//! Calendar-day arithmetic shared by every blocking and retention rule.
//!
//! All comparisons happen on [`NaiveDate`] values: timestamps are stripped to
//! their UTC calendar day before any difference is taken.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::workflows::error::ValidationError;

/// Strip the time of day from a timestamp.
pub fn day_of(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// `count` consecutive calendar dates beginning with `start`.
pub fn consecutive_days(start: NaiveDate, count: u32) -> Vec<NaiveDate> {
    start.iter_days().take(count as usize).collect()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        raw: raw.to_string(),
    })
}
