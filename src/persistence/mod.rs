use crate::Schedule;
use crate::calendar::CalendarError;
use crate::item_validation::ValidationErrors;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("sheet is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait ScheduleStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()>;
    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_schedule_from_csv, load_schedule_from_json, parse_sheet_date, save_items_to_csv,
    save_run_to_csv, save_schedule_to_json,
};
