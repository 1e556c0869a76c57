use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::item_validation::{self, InvalidItemError};

/// Sentinel used by string-only boundaries (CSV sheets, prompts) for "no predecessor".
pub const NO_PREDECESSOR: &str = "-";

/// Milestones take no calendar time; tasks consume working hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Milestone,
    Task { duration_hours: f64 },
}

impl ItemKind {
    /// Zero hours is a milestone, anything else a task.
    pub fn from_hours(duration_hours: f64) -> Self {
        if duration_hours == 0.0 {
            ItemKind::Milestone
        } else {
            ItemKind::Task { duration_hours }
        }
    }

    pub fn duration_hours(&self) -> f64 {
        match self {
            ItemKind::Milestone => 0.0,
            ItemKind::Task { duration_hours } => *duration_hours,
        }
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self, ItemKind::Milestone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Milestone => "milestone",
            ItemKind::Task { .. } => "task",
        }
    }
}

/// Boundary record for one task or milestone, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub start: NaiveDate,
    pub duration_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
}

impl ItemRecord {
    pub fn new(id: impl Into<String>, start: NaiveDate, duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            start,
            duration_hours,
            predecessor: None,
        }
    }

    pub fn with_predecessor(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessor = normalize_predecessor(Some(predecessor.into()));
        self
    }

    pub fn validate(&self) -> Result<Item, InvalidItemError> {
        item_validation::validate_record(self)?;
        Ok(Item {
            id: self.id.trim().to_string(),
            start: self.start,
            kind: ItemKind::from_hours(self.duration_hours),
            predecessor: normalize_predecessor(self.predecessor.clone()),
        })
    }
}

impl TryFrom<ItemRecord> for Item {
    type Error = InvalidItemError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        record.validate()
    }
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            start: item.start,
            duration_hours: item.kind.duration_hours(),
            predecessor: item.predecessor.clone(),
        }
    }
}

/// A validated task or milestone as the engine consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub start: NaiveDate,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
}

impl Item {
    pub fn task(id: impl Into<String>, start: NaiveDate, duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            start,
            kind: ItemKind::from_hours(duration_hours),
            predecessor: None,
        }
    }

    pub fn milestone(id: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start,
            kind: ItemKind::Milestone,
            predecessor: None,
        }
    }

    pub fn after(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessor = normalize_predecessor(Some(predecessor.into()));
        self
    }

    pub fn is_milestone(&self) -> bool {
        self.kind.is_milestone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    Late,
    Started,
    NotStarted,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Completed,
        Status::Late,
        Status::Started,
        Status::NotStarted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::Late => "late",
            Status::Started => "started",
            Status::NotStarted => "not_started",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or(())
    }
}

/// Output record: the input item with its derived end date and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    #[serde(flatten)]
    pub item: Item,
    pub end: NaiveDate,
    pub status: Status,
}

impl ScheduledItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn start(&self) -> NaiveDate {
        self.item.start
    }

    pub fn is_milestone(&self) -> bool {
        self.item.is_milestone()
    }

    /// Calendar days between start and end, the width of the item's bar.
    pub fn span_days(&self) -> i64 {
        (self.end - self.item.start).num_days()
    }
}

/// Empty strings and the `-` sentinel both mean "no predecessor".
pub fn normalize_predecessor(predecessor: Option<String>) -> Option<String> {
    predecessor.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == NO_PREDECESSOR {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
