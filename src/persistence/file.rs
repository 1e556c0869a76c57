use super::{PersistenceError, PersistenceResult};
use crate::calculations::ResolutionStrategy;
use crate::calendar::WorkCalendarConfig;
use crate::engine::ScheduleRun;
use crate::item::{ItemRecord, NO_PREDECESSOR, normalize_predecessor};
use crate::item_validation::{InvalidItemError, InvalidItemReason, ValidationErrors};
use crate::Schedule;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Date layouts accepted in the `Start` column; day-first comes first.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M"];

const REQUIRED_COLUMNS: [&str; 4] = ["Task", "Start", "Duration", "Predecessor"];

#[derive(Serialize, Deserialize)]
struct ScheduleSnapshot {
    #[serde(default)]
    calendar: WorkCalendarConfig,
    #[serde(default)]
    strategy: ResolutionStrategy,
    items: Vec<ItemRecord>,
}

impl ScheduleSnapshot {
    fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            calendar: schedule.calendar_config(),
            strategy: schedule.strategy(),
            items: schedule.records(),
        }
    }

    fn into_schedule(self) -> PersistenceResult<Schedule> {
        let mut schedule = Schedule::from_records(&self.items)?;
        schedule.set_calendar_from_config(&self.calendar)?;
        schedule.set_strategy(self.strategy);
        Ok(schedule)
    }
}

pub fn save_schedule_to_json<P: AsRef<Path>>(
    schedule: &Schedule,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = ScheduleSnapshot::from_schedule(schedule);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let file = File::open(path)?;
    let snapshot: ScheduleSnapshot = serde_json::from_reader(file)?;
    snapshot.into_schedule()
}

/// One row of the item sheet. Every cell is read as text so malformed values
/// can be reported per row instead of failing the whole file. Columns are
/// checked up front; the defaults only cover short rows.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SheetRow {
    #[serde(rename = "Task", default)]
    task: String,
    #[serde(rename = "Start", default)]
    start: String,
    #[serde(rename = "Duration", default)]
    duration: String,
    #[serde(rename = "Predecessor", default)]
    predecessor: String,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "Task")]
    task: &'a str,
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "Duration")]
    duration: f64,
    #[serde(rename = "Predecessor")]
    predecessor: &'a str,
    #[serde(rename = "End")]
    end: String,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "SpanDays")]
    span_days: i64,
}

impl SheetRow {
    fn is_blank(&self) -> bool {
        [&self.task, &self.start, &self.duration, &self.predecessor]
            .iter()
            .all(|cell| cell.trim().is_empty())
    }

    fn into_record(self, line: usize) -> Result<ItemRecord, InvalidItemError> {
        let id = self.task.trim().to_string();
        let label = if id.is_empty() {
            format!("row {line}")
        } else {
            id.clone()
        };
        if id.is_empty() {
            return Err(InvalidItemError::new(label, InvalidItemReason::EmptyId));
        }

        let start = parse_sheet_date(&self.start)
            .map_err(|reason| InvalidItemError::new(label.clone(), reason))?;
        let duration_hours = parse_duration(&self.duration)
            .map_err(|reason| InvalidItemError::new(label.clone(), reason))?;

        Ok(ItemRecord {
            id,
            start,
            duration_hours,
            predecessor: normalize_predecessor(Some(self.predecessor)),
        })
    }
}

impl From<&ItemRecord> for SheetRow {
    fn from(record: &ItemRecord) -> Self {
        Self {
            task: record.id.clone(),
            start: format_date(record.start),
            duration: record.duration_hours.to_string(),
            predecessor: record
                .predecessor
                .clone()
                .unwrap_or_else(|| NO_PREDECESSOR.to_string()),
        }
    }
}

/// Load the `Task,Start,Duration,Predecessor` sheet.
///
/// All four columns must be present in the header. Blank rows are skipped.
/// Any malformed row fails the load with a report that names every offending
/// row.
pub fn load_schedule_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path.as_ref())?;

    let headers = reader.headers()?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PersistenceError::MissingColumns(missing));
    }

    let mut errors = ValidationErrors::default();
    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<SheetRow>().enumerate() {
        let row = row?;
        if row.is_blank() {
            continue;
        }
        // header is line 1
        match row.into_record(idx + 2) {
            Ok(record) => records.push(record),
            Err(err) => errors.push(err),
        }
    }

    let schedule = match Schedule::from_records(&records) {
        Ok(schedule) if errors.is_empty() => schedule,
        Ok(_) => return Err(PersistenceError::Invalid(errors)),
        Err(validation) => {
            for err in validation.0 {
                errors.push(err);
            }
            return Err(PersistenceError::Invalid(errors));
        }
    };

    info!(
        path = %path.as_ref().display(),
        count = schedule.len(),
        "loaded valid tasks and milestones"
    );
    Ok(schedule)
}

/// Write the input sheet back, with whatever start dates the schedule holds.
pub fn save_items_to_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in schedule.records() {
        writer.serialize(SheetRow::from(&record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a finished run in output order with its derived columns.
pub fn save_run_to_csv<P: AsRef<Path>>(run: &ScheduleRun, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for scheduled in &run.items {
        writer.serialize(OutputRow {
            task: scheduled.id(),
            start: format_date(scheduled.start()),
            duration: scheduled.item.kind.duration_hours(),
            predecessor: scheduled
                .item
                .predecessor
                .as_deref()
                .unwrap_or(NO_PREDECESSOR),
            end: format_date(scheduled.end),
            status: scheduled.status.as_str(),
            span_days: scheduled.span_days(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse a `Start` cell: day-first, ISO, or a timestamp whose time is dropped.
pub fn parse_sheet_date(value: &str) -> Result<NaiveDate, InvalidItemReason> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvalidItemReason::MissingStart);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| InvalidItemReason::UnparseableStart(trimmed.to_string()))
}

/// Hours as a number; a decimal comma is accepted.
fn parse_duration(value: &str) -> Result<f64, InvalidItemReason> {
    let trimmed = value.trim();
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| InvalidItemReason::UnparseableDuration(trimmed.to_string()))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
