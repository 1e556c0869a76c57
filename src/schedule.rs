use crate::calculations::ResolutionStrategy;
use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::engine::{ScheduleEngine, ScheduleRun};
use crate::item::{Item, ItemRecord};
use crate::item_validation::{self, InvalidItemError, InvalidItemReason, ValidationErrors};
use chrono::NaiveDate;

/// Editable set of items plus the calendar and strategy used to schedule them.
///
/// Only the input records are stored; end dates and status are produced fresh
/// by [`Schedule::compute`].
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    items: Vec<Item>,
    calendar: WorkCalendar,
    strategy: ResolutionStrategy,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(calendar: WorkCalendar) -> Self {
        Self {
            items: Vec::new(),
            calendar,
            strategy: ResolutionStrategy::default(),
        }
    }

    /// Validate a whole batch of records. Fails with every invalid item listed.
    pub fn from_records(records: &[ItemRecord]) -> Result<Self, ValidationErrors> {
        let items = item_validation::validate_records(records)?;
        Ok(Self {
            items,
            ..Self::default()
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(ItemRecord::from).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replace the item with the same id in place, or append a new one.
    pub fn upsert_item(&mut self, record: ItemRecord) -> Result<(), InvalidItemError> {
        let item = record.validate()?;
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Add an item whose id must not exist yet.
    pub fn insert_item(&mut self, record: ItemRecord) -> Result<(), InvalidItemError> {
        let item = record.validate()?;
        if self.find_item(&item.id).is_some() {
            return Err(InvalidItemError::new(item.id, InvalidItemReason::DuplicateId));
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove an item and clear any predecessor links pointing at it.
    pub fn delete_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }
        for item in &mut self.items {
            if item.predecessor.as_deref() == Some(id) {
                item.predecessor = None;
            }
        }
        true
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
    }

    pub fn set_calendar_from_config(
        &mut self,
        config: &WorkCalendarConfig,
    ) -> Result<(), CalendarError> {
        self.calendar = WorkCalendar::from_config(config)?;
        Ok(())
    }

    pub fn calendar_config(&self) -> WorkCalendarConfig {
        self.calendar.to_config()
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: ResolutionStrategy) {
        self.strategy = strategy;
    }

    pub fn compute(&self, today: NaiveDate) -> ScheduleRun {
        ScheduleEngine::new(&self.calendar)
            .with_strategy(self.strategy)
            .run(&self.items, today)
    }

    /// Copy the start dates a run settled on back into the stored items.
    pub fn apply_run_starts(&mut self, run: &ScheduleRun) {
        for item in &mut self.items {
            if let Some(scheduled) = run.find(&item.id) {
                item.start = scheduled.start();
            }
        }
    }
}
