//! Sunday calendars used by the schedule and availability views.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::MonthKey;

/// The next `count` Sundays strictly after `from`.
///
/// When `from` is itself a Sunday the list starts a week later. The list stops early at the
/// end of the representable calendar.
pub fn upcoming_sundays(from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let offset = 7 - i64::from(from.weekday().num_days_from_sunday());
    let first = from.checked_add_signed(Duration::days(offset));
    std::iter::successors(first, |day| day.checked_add_signed(Duration::weeks(1)))
        .take(count)
        .collect()
}

/// Every Sunday inside `month`.
pub fn sundays_in_month(month: MonthKey) -> Vec<NaiveDate> {
    let first_sunday = month.first_day().and_then(|first_day| {
        let offset = (7 - first_day.weekday().num_days_from_sunday()) % 7;
        first_day.checked_add_signed(Duration::days(i64::from(offset)))
    });
    std::iter::successors(first_sunday, |day| day.checked_add_signed(Duration::weeks(1)))
        .take_while(|day| month.contains(*day))
        .collect()
}
