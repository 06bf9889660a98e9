//! Working-day counting for leave requests.

use chrono::{Datelike, NaiveDate, Weekday};

/// Counts Monday-to-Friday days between `start` and `end`, both inclusive.
///
/// Returns zero if `end` is before `start`. Public holidays are not known
/// to the engine and are counted as working days.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// // 2026-01-12 is a Monday
/// let monday = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// let next_sunday = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
/// assert_eq!(count_working_days(monday, next_sunday), 5);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}
