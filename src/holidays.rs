//! Holiday lookup keyed by country code.
//!
//! The engine never asks the operating system for a locale. Callers resolve a
//! country code (or pass a locale string through [`country_from_locale`]) and
//! hand it to [`resolve_calendar`], which degrades to the configured calendar
//! when no holidays can be found.

use bdays::HolidayCalendar;
use bdays::calendars::{brazil::BRSettlement, us::USSettlement};
use chrono::{Datelike, Duration, NaiveDate};
use std::ops::RangeInclusive;
use tracing::{debug, warn};

use crate::calculations::dependencies::{DependencyResolver, PlacedItem, ResolutionStrategy};
use crate::calculations::duration::compute_end_date;
use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::item::Item;

pub trait HolidayProvider {
    fn holidays(
        &self,
        country: &str,
        years: RangeInclusive<i32>,
    ) -> Result<Vec<NaiveDate>, CalendarError>;
}

/// Holiday tables shipped with the crate: `FR`, `US` and `BR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinHolidays;

impl HolidayProvider for BuiltinHolidays {
    fn holidays(
        &self,
        country: &str,
        years: RangeInclusive<i32>,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        let code = country.trim().to_ascii_uppercase();
        let mut dates = Vec::new();
        for year in years {
            let yearly = match code.as_str() {
                "FR" => french_holidays(year),
                "US" => holidays_from(&USSettlement, year),
                "BR" => holidays_from(&BRSettlement, year),
                _ => return Err(CalendarError::UnsupportedCountry(country.to_string())),
            };
            let yearly = yearly.ok_or_else(|| CalendarError::Lookup {
                country: code.clone(),
                message: format!("year {year} is outside the supported date range"),
            })?;
            dates.extend(yearly);
        }
        dates.sort();
        dates.dedup();
        Ok(dates)
    }
}

fn holidays_from<C: HolidayCalendar<NaiveDate>>(calendar: &C, year: i32) -> Option<Vec<NaiveDate>> {
    let mut day = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let mut dates = Vec::new();
    while day.year() == year {
        if calendar.is_holiday(day) {
            dates.push(day);
        }
        day = day.succ_opt()?;
    }
    Some(dates)
}

fn french_holidays(year: i32) -> Option<Vec<NaiveDate>> {
    let easter = easter_sunday(year)?;
    let fixed = [
        (1, 1),   // Jour de l'an
        (5, 1),   // Fete du travail
        (5, 8),   // Victoire 1945
        (7, 14),  // Fete nationale
        (8, 15),  // Assomption
        (11, 1),  // Toussaint
        (11, 11), // Armistice
        (12, 25), // Noel
    ];

    let mut dates = Vec::with_capacity(fixed.len() + 3);
    for (month, day) in fixed {
        dates.push(NaiveDate::from_ymd_opt(year, month, day)?);
    }
    dates.push(easter + Duration::days(1)); // Lundi de Paques
    dates.push(easter + Duration::days(39)); // Ascension
    dates.push(easter + Duration::days(50)); // Lundi de Pentecote
    dates.sort();
    Some(dates)
}

/// Gregorian Easter Sunday (anonymous algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Region part of a POSIX or BCP 47 locale, e.g. `fr_FR.UTF-8` -> `FR`.
pub fn country_from_locale(locale: &str) -> Result<String, CalendarError> {
    let base = locale
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    base.split(['_', '-'])
        .nth(1)
        .filter(|region| region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|region| region.to_ascii_uppercase())
        .ok_or_else(|| CalendarError::UnknownLocale(locale.to_string()))
}

/// First estimate of the years a run touches: first start year through the
/// year after the latest end date on `calendar`, before dependency shifts.
pub fn schedule_years(items: &[Item], calendar: &WorkCalendar) -> Option<RangeInclusive<i32>> {
    let first = items.iter().map(|item| item.start.year()).min()?;
    let last = items
        .iter()
        .map(|item| compute_end_date(item.start, item.kind, calendar).year())
        .max()?;
    Some(first..=last.saturating_add(1))
}

/// Build the run calendar from an explicit configuration plus looked-up holidays.
///
/// A missing country or a failed lookup is logged and the configured calendar
/// is used as is. Only an unusable configuration is an error.
pub fn resolve_calendar(
    config: &WorkCalendarConfig,
    provider: &dyn HolidayProvider,
    country: Option<&str>,
    years: RangeInclusive<i32>,
) -> Result<WorkCalendar, CalendarError> {
    let mut calendar = WorkCalendar::from_config(config)?;

    let Some(country) = country.filter(|code| !code.trim().is_empty()) else {
        warn!("no country code given, scheduling with configured holidays only");
        return Ok(calendar);
    };

    match provider.holidays(country, years.clone()) {
        Ok(dates) => {
            debug!(
                country,
                count = dates.len(),
                first_year = years.start(),
                last_year = years.end(),
                "loaded holidays"
            );
            calendar.add_holidays(&dates);
        }
        Err(err) => {
            warn!(country, error = %err, "holiday lookup failed, scheduling with configured holidays only");
        }
    }
    Ok(calendar)
}

/// Like [`resolve_calendar`], but makes sure the looked-up holidays cover every
/// year the resolved items reach.
///
/// Dependency shifts and the holidays themselves push end dates later, so the
/// year range grows and holidays are looked up again until no item ends past
/// it. `fallback` is used when there are no items.
pub fn resolve_calendar_for_items(
    items: &[Item],
    strategy: ResolutionStrategy,
    config: &WorkCalendarConfig,
    provider: &dyn HolidayProvider,
    country: Option<&str>,
    fallback: RangeInclusive<i32>,
) -> Result<WorkCalendar, CalendarError> {
    let base = WorkCalendar::from_config(config)?;
    let mut years = schedule_years(items, &base).unwrap_or(fallback);
    if country.is_none_or(|code| code.trim().is_empty()) {
        return resolve_calendar(config, provider, country, years);
    }

    loop {
        let calendar = resolve_calendar(config, provider, country, years.clone())?;
        let placed = items
            .iter()
            .map(|item| PlacedItem::new(item.clone(), &calendar))
            .collect();
        let resolution = DependencyResolver::new(&calendar, strategy).resolve(placed);
        let last_end = resolution
            .items
            .iter()
            .map(|placed| placed.end.year())
            .max();

        match last_end {
            Some(last) if last > *years.end() => {
                debug!(
                    previous_last_year = years.end(),
                    last_year = last,
                    "run ends past looked-up holidays, widening year range"
                );
                years = *years.start()..=last.saturating_add(1);
            }
            _ => return Ok(calendar),
        }
    }
}
