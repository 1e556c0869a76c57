use crate::calendar::WorkCalendar;
use crate::item::ItemKind;
use chrono::{Datelike, NaiveDate};
use std::ops::RangeInclusive;

/// Working capacity of one working day.
pub const HOURS_PER_WORKING_DAY: f64 = 8.0;

/// Largest accepted duration: one hundred years of working days.
pub const MAX_DURATION_HOURS: f64 = HOURS_PER_WORKING_DAY * 366.0 * 100.0;

/// Start years an item may use. Sheets carry four digit years.
pub const SUPPORTED_START_YEARS: RangeInclusive<i32> = 1..=9999;

/// End date of an item starting on `start`.
///
/// The result is the day after the last working day whose capacity was
/// consumed, so an 8 hour task starting Monday ends Tuesday. Milestones end on
/// their start date.
pub fn compute_end_date(start: NaiveDate, kind: ItemKind, calendar: &WorkCalendar) -> NaiveDate {
    match kind {
        ItemKind::Milestone => start,
        ItemKind::Task { duration_hours } => end_date_for_hours(start, duration_hours, calendar),
    }
}

/// Walks forward from `start` consuming working-day capacity. Stops at
/// `NaiveDate::MAX` rather than overflowing.
pub fn end_date_for_hours(start: NaiveDate, duration_hours: f64, calendar: &WorkCalendar) -> NaiveDate {
    if duration_hours <= 0.0 {
        return start;
    }

    let mut current = start;
    let mut remaining = duration_hours;
    while remaining > 0.0 {
        if calendar.is_working_day(current) {
            remaining -= HOURS_PER_WORKING_DAY;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Whether `start` lies in the years the scheduler accepts.
pub fn is_supported_start(start: NaiveDate) -> bool {
    SUPPORTED_START_YEARS.contains(&start.year())
}
