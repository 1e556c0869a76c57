use std::ops::RangeInclusive;

use blind_gantt::holidays::easter_sunday;
use blind_gantt::{
    BuiltinHolidays, CalendarError, HolidayProvider, Item, ResolutionStrategy, ScheduleEngine,
    WorkCalendar, WorkCalendarConfig, country_from_locale, resolve_calendar,
    resolve_calendar_for_items, schedule_years,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct FailingProvider;

impl HolidayProvider for FailingProvider {
    fn holidays(
        &self,
        country: &str,
        _years: RangeInclusive<i32>,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        Err(CalendarError::Lookup {
            country: country.to_string(),
            message: "service unreachable".into(),
        })
    }
}

#[test]
fn easter_dates_match_known_years() {
    assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
    assert_eq!(easter_sunday(2025), Some(d(2025, 4, 20)));
    assert_eq!(easter_sunday(2026), Some(d(2026, 4, 5)));
}

#[test]
fn french_holidays_include_moveable_feasts() {
    let dates = BuiltinHolidays.holidays("fr", 2025..=2025).unwrap();
    for expected in [
        d(2025, 1, 1),
        d(2025, 4, 21),
        d(2025, 5, 1),
        d(2025, 5, 8),
        d(2025, 5, 29),
        d(2025, 6, 9),
        d(2025, 7, 14),
        d(2025, 8, 15),
        d(2025, 11, 1),
        d(2025, 11, 11),
        d(2025, 12, 25),
    ] {
        assert!(dates.contains(&expected), "missing {expected}");
    }
    assert_eq!(dates.len(), 11);
}

#[test]
fn holidays_cover_every_requested_year() {
    let dates = BuiltinHolidays.holidays("FR", 2025..=2026).unwrap();
    assert!(dates.contains(&d(2025, 7, 14)));
    assert!(dates.contains(&d(2026, 7, 14)));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn us_calendar_knows_independence_day() {
    let dates = BuiltinHolidays.holidays("US", 2025..=2025).unwrap();
    assert!(dates.contains(&d(2025, 7, 4)));
}

#[test]
fn unknown_country_is_unsupported() {
    let err = BuiltinHolidays.holidays("ZZ", 2025..=2025).unwrap_err();
    assert_eq!(err, CalendarError::UnsupportedCountry("ZZ".into()));
}

#[test]
fn country_is_read_from_locale_strings() {
    assert_eq!(country_from_locale("fr_FR.UTF-8").unwrap(), "FR");
    assert_eq!(country_from_locale("en-us").unwrap(), "US");
    assert_eq!(country_from_locale("pt_BR@euro").unwrap(), "BR");
    assert!(matches!(
        country_from_locale("C.UTF-8"),
        Err(CalendarError::UnknownLocale(_))
    ));
    assert!(country_from_locale("").is_err());
}

#[test]
fn years_span_first_start_through_year_after_last_end() {
    let items = vec![
        Item::task("A", d(2025, 11, 3), 8.0),
        Item::milestone("M", d(2026, 2, 2)),
    ];
    let cal = WorkCalendar::default();
    assert_eq!(schedule_years(&items, &cal), Some(2025..=2027));
    assert_eq!(schedule_years(&[], &cal), None);

    // 300 working days from December 2026 run into 2028
    let long = vec![Item::task("A", d(2026, 12, 1), 2400.0)];
    assert_eq!(schedule_years(&long, &cal), Some(2026..=2029));
}

#[test]
fn holidays_cover_years_reached_through_dependencies() {
    let items = vec![
        Item::task("A", d(2026, 12, 1), 2400.0),
        Item::task("B", d(2026, 12, 1), 2400.0).after("A"),
        Item::task("C", d(2026, 12, 1), 2400.0).after("B"),
    ];
    let config = WorkCalendarConfig::default();
    assert_eq!(
        schedule_years(&items, &WorkCalendar::from_config(&config).unwrap()),
        Some(2026..=2029)
    );

    let cal = resolve_calendar_for_items(
        &items,
        ResolutionStrategy::Topological,
        &config,
        &BuiltinHolidays,
        Some("FR"),
        2025..=2026,
    )
    .unwrap();
    let run = ScheduleEngine::new(&cal).run(&items, d(2026, 11, 2));
    let last_end = run.items.iter().map(|item| item.end).max().unwrap();
    assert!(last_end > d(2030, 5, 8), "{last_end}");

    // Fete du Travail and Victoire 1945 fall on Wednesdays in 2030
    assert!(!cal.is_working_day(d(2028, 5, 1)));
    assert!(!cal.is_working_day(d(2030, 5, 1)));
    assert!(!cal.is_working_day(d(2030, 5, 8)));
}

#[test]
fn empty_items_use_fallback_years() {
    let cal = resolve_calendar_for_items(
        &[],
        ResolutionStrategy::Topological,
        &WorkCalendarConfig::default(),
        &BuiltinHolidays,
        Some("FR"),
        2031..=2031,
    )
    .unwrap();
    assert!(!cal.is_working_day(d(2031, 7, 14)));
    assert!(cal.is_working_day(d(2032, 7, 14)));
}

#[test]
fn resolve_calendar_merges_configured_and_looked_up_holidays() {
    let config = WorkCalendarConfig::new([], [d(2025, 3, 3)]);
    let cal = resolve_calendar(&config, &BuiltinHolidays, Some("FR"), 2025..=2025).unwrap();
    assert!(!cal.is_working_day(d(2025, 3, 3)));
    assert!(!cal.is_working_day(d(2025, 7, 14)));
    // no weekend configured
    assert!(cal.is_working_day(d(2025, 1, 4)));
}

#[test]
fn failed_lookup_degrades_to_configured_calendar() {
    let config = WorkCalendarConfig::default();
    let cal = resolve_calendar(&config, &FailingProvider, Some("FR"), 2025..=2025).unwrap();
    assert!(cal.holidays().is_empty());
    assert!(cal.is_working_day(d(2025, 7, 14)));

    let cal = resolve_calendar(&config, &BuiltinHolidays, Some("ZZ"), 2025..=2025).unwrap();
    assert!(cal.holidays().is_empty());
}

#[test]
fn missing_country_keeps_configured_calendar() {
    let config = WorkCalendarConfig::default();
    let cal = resolve_calendar(&config, &BuiltinHolidays, None, 2025..=2025).unwrap();
    assert!(cal.holidays().is_empty());
    let cal = resolve_calendar(&config, &BuiltinHolidays, Some("  "), 2025..=2025).unwrap();
    assert!(cal.holidays().is_empty());
}
