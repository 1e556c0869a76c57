use crate::calculations::{
    DependencyResolver, PlacedItem, ResolutionStrategy, ResolutionWarning, classify,
};
use crate::calendar::WorkCalendar;
use crate::item::{Item, ScheduledItem, Status};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Runs one scheduling pass: end dates, predecessor constraints, status, ordering.
pub struct ScheduleEngine<'a> {
    calendar: &'a WorkCalendar,
    strategy: ResolutionStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRun {
    pub today: NaiveDate,
    pub items: Vec<ScheduledItem>,
    pub warnings: Vec<ResolutionWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub item_count: usize,
    pub milestone_count: usize,
    pub task_count: usize,
    pub completed_count: usize,
    pub late_count: usize,
    pub started_count: usize,
    pub not_started_count: usize,
    pub warning_count: usize,
    pub latest_end: Option<NaiveDate>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("items={}", self.item_count));
        parts.push(format!("milestones={}", self.milestone_count));
        parts.push(format!("tasks={}", self.task_count));
        if self.completed_count > 0 {
            parts.push(format!("completed={}", self.completed_count));
        }
        if self.late_count > 0 {
            parts.push(format!("late={}", self.late_count));
        }
        if self.started_count > 0 {
            parts.push(format!("started={}", self.started_count));
        }
        if self.not_started_count > 0 {
            parts.push(format!("not_started={}", self.not_started_count));
        }
        if self.warning_count > 0 {
            parts.push(format!("warnings={}", self.warning_count));
        }
        if let Some(date) = self.latest_end {
            parts.push(format!("finish={}", date));
        }
        parts.join(", ")
    }
}

impl ScheduleRun {
    pub fn summary(&self) -> ScheduleSummary {
        let count = |status: Status| self.items.iter().filter(|i| i.status == status).count();
        let milestone_count = self.items.iter().filter(|i| i.is_milestone()).count();
        ScheduleSummary {
            item_count: self.items.len(),
            milestone_count,
            task_count: self.items.len() - milestone_count,
            completed_count: count(Status::Completed),
            late_count: count(Status::Late),
            started_count: count(Status::Started),
            not_started_count: count(Status::NotStarted),
            warning_count: self.warnings.len(),
            latest_end: self.items.iter().map(|i| i.end).max(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&ScheduledItem> {
        self.items.iter().find(|i| i.id() == id)
    }
}

impl<'a> ScheduleEngine<'a> {
    pub fn new(calendar: &'a WorkCalendar) -> Self {
        Self {
            calendar,
            strategy: ResolutionStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Schedule `items` against `today`. The input is left untouched; the
    /// output lists milestones by start date, then tasks by start date.
    pub fn run(&self, items: &[Item], today: NaiveDate) -> ScheduleRun {
        let placed: Vec<PlacedItem> = items
            .iter()
            .cloned()
            .map(|item| PlacedItem::new(item, self.calendar))
            .collect();

        let resolution = DependencyResolver::new(self.calendar, self.strategy).resolve(placed);
        for warning in &resolution.warnings {
            warn!(%warning, "dependency not applied");
        }

        let mut scheduled: Vec<ScheduledItem> = resolution
            .items
            .into_iter()
            .map(|placed| {
                let status = classify(placed.item.start, placed.end, placed.item.kind, today);
                ScheduledItem {
                    item: placed.item,
                    end: placed.end,
                    status,
                }
            })
            .collect();

        scheduled.sort_by(|a, b| {
            b.is_milestone()
                .cmp(&a.is_milestone())
                .then_with(|| a.start().cmp(&b.start()))
        });

        let run = ScheduleRun {
            today,
            items: scheduled,
            warnings: resolution.warnings,
        };
        info!(
            strategy = self.strategy.as_str(),
            today = %today,
            summary = %run.summary().to_cli_summary(),
            "schedule computed"
        );
        run
    }
}
