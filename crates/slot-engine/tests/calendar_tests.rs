//! Tests for the rolling placeholder window and weekday helpers.

use chrono::{Datelike, NaiveDate, Weekday};
use slot_engine::calendar::{candidate_dates, is_friday, is_weekend, next_eligible_weekday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn window_starts_two_days_out_and_skips_weekends() {
    // Thursday 2025-06-05 + 2 days = Saturday → first candidate is Monday 06/09.
    let dates = candidate_dates(date(2025, 6, 5), 2, 7);

    assert_eq!(
        dates,
        vec![
            date(2025, 6, 9),
            date(2025, 6, 10),
            date(2025, 6, 11),
            date(2025, 6, 12),
            date(2025, 6, 13),
            date(2025, 6, 16),
            date(2025, 6, 17),
        ]
    );
}

#[test]
fn window_from_a_weekday_includes_the_start() {
    // Monday + 2 = Wednesday.
    let dates = candidate_dates(date(2025, 6, 9), 2, 3);
    assert_eq!(dates, vec![date(2025, 6, 11), date(2025, 6, 12), date(2025, 6, 13)]);
}

#[test]
fn window_crosses_month_and_year_boundaries() {
    let dates = candidate_dates(date(2025, 12, 29), 2, 4);
    assert_eq!(
        dates,
        vec![date(2025, 12, 31), date(2026, 1, 1), date(2026, 1, 2), date(2026, 1, 5)]
    );
}

#[test]
fn zero_count_is_empty() {
    assert!(candidate_dates(date(2025, 6, 9), 2, 0).is_empty());
}

#[test]
fn window_never_contains_weekends() {
    let dates = candidate_dates(date(2025, 1, 1), 0, 100);
    assert_eq!(dates.len(), 100);
    assert!(dates.iter().all(|d| !is_weekend(*d)));
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn next_eligible_weekday_is_identity_on_weekdays() {
    for offset in 0..7 {
        let d = date(2025, 6, 9 + offset);
        let next = next_eligible_weekday(d);
        if is_weekend(d) {
            assert_eq!(next.weekday(), Weekday::Mon);
        } else {
            assert_eq!(next, d);
        }
    }
}

#[test]
fn only_friday_is_friday() {
    assert!(is_friday(date(2025, 6, 6)));
    assert!(!is_friday(date(2025, 6, 5)));
    assert!(!is_friday(date(2025, 6, 7)));
}

#[test]
fn end_of_range_does_not_overflow() {
    // Must not panic at the end of chrono's range.
    let last = NaiveDate::MAX;
    let _ = next_eligible_weekday(last);
    assert!(candidate_dates(last, 5, 3).is_empty());
}
