//! Expiration classification
//!
//! All comparisons happen on calendar dates ([`NaiveDate`]), so there is no
//! time-of-day or timezone offset that could move a boundary date into a
//! neighbouring bucket.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::record::ValidationError;

/// Last day (inclusive) of the "expiring within 30 days" window
pub const SOON_DAYS: i64 = 30;

/// Last day (inclusive) of the "expiring within 90 days" window
pub const LATER_DAYS: i64 = 90;

/// Expiration bucket of a record relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringWithin30,
    ExpiringWithin90,
    Ok,
    /// No expiration date is tracked
    Unset,
}

impl ExpiryStatus {
    /// Short label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "Expired",
            ExpiryStatus::ExpiringWithin30 => "< 30d",
            ExpiryStatus::ExpiringWithin90 => "< 90d",
            ExpiryStatus::Ok => "OK",
            ExpiryStatus::Unset => "No date",
        }
    }

    /// Returns true for both "expiring" buckets
    pub fn is_expiring_soon(&self) -> bool {
        matches!(
            self,
            ExpiryStatus::ExpiringWithin30 | ExpiryStatus::ExpiringWithin90
        )
    }
}

/// Classifies an expiration date relative to `today`
pub fn classify(expiration: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    let Some(expiration) = expiration else {
        return ExpiryStatus::Unset;
    };

    let diff_days = (expiration - today).num_days();
    match diff_days {
        d if d < 0 => ExpiryStatus::Expired,
        d if d <= SOON_DAYS => ExpiryStatus::ExpiringWithin30,
        d if d <= LATER_DAYS => ExpiryStatus::ExpiringWithin90,
        _ => ExpiryStatus::Ok,
    }
}

/// Classifies a raw stored date string; unparseable input is `Unset`
pub fn classify_str(expiration: &str, today: NaiveDate) -> ExpiryStatus {
    classify(parse_iso_date(expiration), today)
}

/// The current calendar day on this machine
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a stored `YYYY-MM-DD` date, returning None for anything invalid
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a date typed by a person.
///
/// Accepted forms:
/// - `DD/MM/YYYY` - must be a real calendar date
/// - `MM/YYYY` - resolves to the last day of that month
/// - `YYYY-MM-DD`
///
/// Blank input means "no expiration date" and yields `Ok(None)`.
pub fn parse_date_input(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = input.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let invalid = || ValidationError::InvalidDate(value.to_string());
    let parts: Vec<&str> = value.split('/').collect();

    match parts.as_slice() {
        [month, year] => {
            let month = parse_component(month, 1, 2).ok_or_else(invalid)?;
            let year = parse_component(year, 4, 4).ok_or_else(invalid)?;
            if !(1..=12).contains(&month) || year <= 1900 {
                return Err(invalid());
            }
            last_day_of_month(year as i32, month).map(Some).ok_or_else(invalid)
        }
        [day, month, year] => {
            let day = parse_component(day, 1, 2).ok_or_else(invalid)?;
            let month = parse_component(month, 1, 2).ok_or_else(invalid)?;
            let year = parse_component(year, 4, 4).ok_or_else(invalid)?;
            NaiveDate::from_ymd_opt(year as i32, month, day)
                .map(Some)
                .ok_or_else(invalid)
        }
        _ => parse_iso_date(value).map(Some).ok_or_else(invalid),
    }
}

/// Formats a date as `DD/MM/YYYY`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn parse_component(s: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if s.len() < min_len || s.len() > max_len || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = first_of_next.pred_opt()?;
    debug_assert_eq!(last.month(), month);
    Some(last)
}
