//! Calendar helpers -- date keys, weekday rules and rolling candidate windows.
//!
//! The booking backend keys its booked map by `MM/DD/YYYY` and accepts lead
//! submissions with ISO `YYYY-MM-DD` dates. Both serializations live here so
//! every caller formats dates the same way.

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// `strftime` pattern for booked-map keys (e.g. `06/06/2025`).
pub const DATE_KEY_FORMAT: &str = "%m/%d/%Y";

/// `strftime` pattern for submission dates (e.g. `2025-06-06`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialize a date as a booked-map key (`MM/DD/YYYY`).
pub fn format_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Serialize a date as `YYYY-MM-DD`.
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parse a booked-map key. Only the exact `MM/DD/YYYY` form is accepted.
pub fn parse_key(key: &str) -> Option<NaiveDate> {
    // chrono accepts single-digit months and days for %m/%d; keys never have them.
    if key.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Parse a user-supplied date in either ISO (`2025-06-06`) or key
/// (`06/06/2025`) form.
///
/// # Errors
/// Returns `EngineError::InvalidDate` if neither form matches.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .ok()
        .or_else(|| parse_key(trimmed))
        .ok_or_else(|| {
            EngineError::InvalidDate(format!(
                "'{}' (expected YYYY-MM-DD or MM/DD/YYYY)",
                input
            ))
        })
}

/// True for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// True for Friday, the only day the restricted slot runs.
pub fn is_friday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri
}

/// Advance `date` one day at a time until it lands on Monday..Friday.
///
/// Weekdays are returned unchanged. At the very end of chrono's date range the
/// input is returned as-is rather than overflowing.
pub fn next_eligible_weekday(date: NaiveDate) -> NaiveDate {
    let mut cursor = date;
    while is_weekend(cursor) {
        match cursor.succ_opt() {
            Some(next) => cursor = next,
            None => return cursor,
        }
    }
    cursor
}

/// The placeholder window: `count` consecutive weekdays starting `lead_days`
/// after `today`.
///
/// Booking state is ignored; this is the list a form can show before the
/// booked map arrives. Use [`crate::AvailabilityEngine::valid_dates`] for the
/// authoritative list.
pub fn candidate_dates(today: NaiveDate, lead_days: u32, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let Some(start) = today.checked_add_days(Days::new(u64::from(lead_days))) else {
        return dates;
    };

    let mut cursor = next_eligible_weekday(start);
    while dates.len() < count && !is_weekend(cursor) {
        dates.push(cursor);
        match cursor.succ_opt() {
            Some(next) => cursor = next_eligible_weekday(next),
            None => break,
        }
    }
    dates
}

/// Today's date as seen from the given timezone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn key_is_zero_padded() {
        assert_eq!(format_key(date(2025, 6, 6)), "06/06/2025");
        assert_eq!(format_iso(date(2025, 6, 6)), "2025-06-06");
    }

    #[test]
    fn parse_key_rejects_unpadded_and_iso() {
        assert_eq!(parse_key("06/06/2025"), Some(date(2025, 6, 6)));
        assert_eq!(parse_key("6/6/2025"), None);
        assert_eq!(parse_key("2025-06-06"), None);
        assert_eq!(parse_key("13/01/2025"), None);
    }

    #[test]
    fn parse_date_accepts_both_forms() {
        assert_eq!(parse_date("2025-06-06").unwrap(), date(2025, 6, 6));
        assert_eq!(parse_date(" 06/06/2025 ").unwrap(), date(2025, 6, 6));
        assert!(matches!(
            parse_date("next friday"),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn weekend_rolls_to_monday() {
        // 2025-06-07 is a Saturday.
        assert_eq!(next_eligible_weekday(date(2025, 6, 7)), date(2025, 6, 9));
        assert_eq!(next_eligible_weekday(date(2025, 6, 8)), date(2025, 6, 9));
        assert_eq!(next_eligible_weekday(date(2025, 6, 6)), date(2025, 6, 6));
    }
}
