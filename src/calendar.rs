use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("no holiday calendar available for country '{0}'")]
    UnsupportedCountry(String),
    #[error("cannot determine a country code from locale '{0}'")]
    UnknownLocale(String),
    #[error("holiday lookup failed for '{country}': {message}")]
    Lookup { country: String, message: String },
    #[error("calendar must keep at least one working weekday")]
    NoWorkingDays,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    weekend_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    #[serde(default = "WorkCalendarConfig::default_weekend_days")]
    weekend_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::weekends_only()
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Saturday/Sunday weekends and no holidays.
    pub fn weekends_only() -> Self {
        Self {
            holidays: HashSet::new(),
            weekend_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }

    /// Every day of the week is a working day.
    pub fn all_working() -> Self {
        Self {
            holidays: HashSet::new(),
            weekend_days: HashSet::new(),
        }
    }

    pub fn custom<I, J>(weekend_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(weekend_days, holidays);
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let weekend_days: HashSet<Weekday> = config.weekend_days.iter().copied().collect();
        if weekend_days.len() >= Self::ALL_WEEKDAYS.len() {
            return Err(CalendarError::NoWorkingDays);
        }

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            weekend_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    /// Add a single holiday
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Add multiple holidays at once
    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    pub fn holidays(&self) -> Vec<NaiveDate> {
        let mut holidays: Vec<NaiveDate> = self.holidays.iter().copied().collect();
        holidays.sort();
        holidays
    }

    pub fn weekend_days(&self) -> Vec<Weekday> {
        let mut days: Vec<Weekday> = self.weekend_days.iter().copied().collect();
        days.sort_by_key(|wd| wd.num_days_from_monday());
        days
    }

    /// True when the date is neither a weekend day nor a holiday.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.weekend_days.contains(&date.weekday())
    }

    /// Count working days in an inclusive date range
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;

        while current <= end {
            if self.is_working_day(current) {
                count += 1;
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        count
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(weekend_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut weekend: Vec<Weekday> = weekend_days.into_iter().collect();
        weekend.sort_by_key(|wd| wd.num_days_from_monday());
        weekend.dedup_by(|a, b| a.num_days_from_monday() == b.num_days_from_monday());

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Self {
            weekend_days: weekend,
            holidays,
        }
    }

    fn default_weekend_days() -> Vec<Weekday> {
        vec![Weekday::Sat, Weekday::Sun]
    }

    pub fn weekend_days(&self) -> &[Weekday] {
        &self.weekend_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        Self::new(Self::default_weekend_days(), [])
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        Self::new(calendar.weekend_days(), calendar.holidays())
    }
}
