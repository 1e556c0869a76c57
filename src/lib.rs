pub mod calculations;
pub mod calendar;
pub mod engine;
pub mod frame;
pub mod graph;
pub mod holidays;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod item;
pub mod item_validation;
pub mod persistence;
pub mod schedule;

pub use calculations::{
    DependencyResolver, HOURS_PER_WORKING_DAY, MAX_DURATION_HOURS, PlacedItem, Resolution,
    ResolutionStrategy, ResolutionWarning, classify, compute_end_date, end_date_for_hours,
};
pub use calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
pub use engine::{ScheduleEngine, ScheduleRun, ScheduleSummary};
pub use frame::scheduled_items_to_dataframe;
pub use holidays::{
    BuiltinHolidays, HolidayProvider, country_from_locale, resolve_calendar,
    resolve_calendar_for_items, schedule_years,
};
pub use item::{Item, ItemKind, ItemRecord, NO_PREDECESSOR, ScheduledItem, Status};
pub use item_validation::{InvalidItemError, InvalidItemReason, ValidationErrors};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteScheduleStore;
pub use persistence::{
    PersistenceError, ScheduleStore, load_schedule_from_csv, load_schedule_from_json,
    parse_sheet_date, save_items_to_csv, save_run_to_csv, save_schedule_to_json,
};
pub use schedule::Schedule;
