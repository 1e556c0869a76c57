use super::{PersistenceResult, ScheduleStore};
use crate::Schedule;
use crate::calculations::ResolutionStrategy;
use crate::calendar::WorkCalendarConfig;
use crate::item::ItemRecord;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Calendar and strategy share one row; items are stored one JSON record per row.
#[derive(Serialize, Deserialize)]
struct StoredSettings {
    calendar: WorkCalendarConfig,
    strategy: ResolutionStrategy,
}

pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS schedule_calendar (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                settings_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS items (
                position INTEGER PRIMARY KEY,
                item_id TEXT NOT NULL UNIQUE,
                item_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_settings(
        &self,
        tx: &rusqlite::Transaction,
        schedule: &Schedule,
    ) -> PersistenceResult<()> {
        let settings = StoredSettings {
            calendar: schedule.calendar_config(),
            strategy: schedule.strategy(),
        };
        let json = serde_json::to_string(&settings)?;
        tx.execute("DELETE FROM schedule_calendar", [])?;
        tx.execute(
            "INSERT INTO schedule_calendar (id, settings_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_items(&self, tx: &rusqlite::Transaction, schedule: &Schedule) -> PersistenceResult<()> {
        tx.execute("DELETE FROM items", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO items (position, item_id, item_json) VALUES (?1, ?2, ?3)")?;
        for (position, record) in schedule.records().iter().enumerate() {
            let json = serde_json::to_string(record)?;
            stmt.execute(params![position as i64, record.id, json])?;
        }
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_settings(&tx, schedule)?;
        self.save_items(&tx, schedule)?;
        tx.commit()?;
        Ok(())
    }

    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT settings_json FROM schedule_calendar WHERE id = 1")?;
        let settings_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(settings_json) = settings_json else {
            return Ok(None);
        };
        let settings: StoredSettings = serde_json::from_str(&settings_json)?;

        let mut stmt = conn.prepare("SELECT item_json FROM items ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for json in rows {
            let json = json?;
            let record: ItemRecord = serde_json::from_str(&json)?;
            records.push(record);
        }

        let mut schedule = Schedule::from_records(&records)?;
        schedule.set_calendar_from_config(&settings.calendar)?;
        schedule.set_strategy(settings.strategy);
        Ok(Some(schedule))
    }
}
