use blind_gantt::{
    ItemKind, MAX_DURATION_HOURS, WorkCalendar, compute_end_date, end_date_for_hours,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monday() -> NaiveDate {
    // 2025-01-06
    d(2025, 1, 6)
}

#[test]
fn milestone_ends_on_its_start() {
    let cal = WorkCalendar::default();
    for start in [monday(), d(2025, 1, 4), d(2025, 12, 25)] {
        assert_eq!(compute_end_date(start, ItemKind::Milestone, &cal), start);
        assert_eq!(end_date_for_hours(start, 0.0, &cal), start);
    }
}

#[test]
fn one_working_day_ends_the_next_day() {
    let cal = WorkCalendar::all_working();
    let task = ItemKind::Task { duration_hours: 8.0 };
    assert_eq!(compute_end_date(monday(), task, &cal), d(2025, 1, 7));
}

#[test]
fn two_working_days_end_two_days_later() {
    let cal = WorkCalendar::all_working();
    assert_eq!(end_date_for_hours(monday(), 16.0, &cal), d(2025, 1, 8));
}

#[test]
fn whole_days_advance_by_day_count_on_all_working_calendar() {
    let cal = WorkCalendar::all_working();
    for days in 1..=20i64 {
        let end = end_date_for_hours(monday(), 8.0 * days as f64, &cal);
        assert_eq!((end - monday()).num_days(), days);
    }
}

#[test]
fn partial_day_consumes_a_whole_day() {
    let cal = WorkCalendar::default();
    assert_eq!(end_date_for_hours(monday(), 4.0, &cal), d(2025, 1, 7));
    assert_eq!(end_date_for_hours(monday(), 12.0, &cal), d(2025, 1, 8));
}

#[test]
fn weekend_adds_calendar_days_without_consuming_hours() {
    let cal = WorkCalendar::default();
    let friday = d(2025, 1, 3);
    // Friday is consumed, the end is the day after it
    assert_eq!(end_date_for_hours(friday, 8.0, &cal), d(2025, 1, 4));
    // Friday, then Monday after skipping the weekend
    assert_eq!(end_date_for_hours(friday, 16.0, &cal), d(2025, 1, 7));
    // a full week from Monday lands on the following Monday
    assert_eq!(end_date_for_hours(monday(), 40.0, &cal), d(2025, 1, 11));
    assert_eq!(end_date_for_hours(monday(), 48.0, &cal), d(2025, 1, 14));
}

#[test]
fn start_on_weekend_waits_for_first_working_day() {
    let cal = WorkCalendar::default();
    let saturday = d(2025, 1, 4);
    assert_eq!(end_date_for_hours(saturday, 8.0, &cal), d(2025, 1, 7));
}

#[test]
fn holidays_lengthen_the_span() {
    let mut cal = WorkCalendar::default();
    let plain = end_date_for_hours(monday(), 24.0, &cal);
    assert_eq!(plain, d(2025, 1, 9));

    cal.add_holiday(d(2025, 1, 7));
    let with_holiday = end_date_for_hours(monday(), 24.0, &cal);
    assert_eq!(with_holiday, d(2025, 1, 10));
}

#[test]
fn end_date_stops_at_the_last_representable_day() {
    let cal = WorkCalendar::default();
    assert_eq!(end_date_for_hours(NaiveDate::MAX, 8.0, &cal), NaiveDate::MAX);

    let near_end = NaiveDate::MAX.pred_opt().unwrap().pred_opt().unwrap();
    assert_eq!(end_date_for_hours(near_end, 800.0, &cal), NaiveDate::MAX);
    assert!(cal.count_working_days(near_end, NaiveDate::MAX) <= 3);
}

#[test]
fn longest_accepted_duration_finishes() {
    let cal = WorkCalendar::default();
    let end = end_date_for_hours(d(9999, 12, 31), MAX_DURATION_HOURS, &cal);
    assert!(end > d(10_099, 1, 1), "{end}");
}
