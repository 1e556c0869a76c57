use crate::calculations::duration::compute_end_date;
use crate::calendar::WorkCalendar;
use crate::graph::ItemDag;
use crate::item::Item;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// How predecessor constraints are propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// One pass in input order. Chains listed out of order may see a stale
    /// predecessor end, and cycles go unnoticed.
    SinglePass,
    /// Visit items in dependency order so chains of any length converge.
    /// Cycles are reported and their members left in place.
    #[default]
    Topological,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::SinglePass => "single_pass",
            ResolutionStrategy::Topological => "topological",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "single_pass" | "single" => Ok(ResolutionStrategy::SinglePass),
            "topological" | "topo" => Ok(ResolutionStrategy::Topological),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ResolutionWarning {
    #[error("item '{item}' depends on unknown item '{predecessor}', constraint ignored")]
    UnresolvedPredecessor { item: String, predecessor: String },
    #[error("dependency cycle between {}, constraints left unresolved", .items.join(", "))]
    Cycle { items: Vec<String> },
}

/// An item together with its current end date.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub item: Item,
    pub end: NaiveDate,
}

impl PlacedItem {
    pub fn new(item: Item, calendar: &WorkCalendar) -> Self {
        let end = compute_end_date(item.start, item.kind, calendar);
        Self { item, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub items: Vec<PlacedItem>,
    pub warnings: Vec<ResolutionWarning>,
}

pub struct DependencyResolver<'a> {
    calendar: &'a WorkCalendar,
    strategy: ResolutionStrategy,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(calendar: &'a WorkCalendar, strategy: ResolutionStrategy) -> Self {
        Self { calendar, strategy }
    }

    /// Push every dependent item's start to its predecessor's end when it would
    /// otherwise begin earlier, recomputing its end date.
    pub fn resolve(&self, mut items: Vec<PlacedItem>) -> Resolution {
        let dag = ItemDag::build(
            items
                .iter()
                .map(|placed| (placed.item.id.as_str(), placed.item.predecessor.as_deref())),
        );

        let mut warnings: Vec<ResolutionWarning> = dag
            .unresolved()
            .iter()
            .map(|(position, predecessor)| ResolutionWarning::UnresolvedPredecessor {
                item: items[*position].item.id.clone(),
                predecessor: predecessor.clone(),
            })
            .collect();

        match self.strategy {
            ResolutionStrategy::SinglePass => {
                for position in 0..items.len() {
                    if let Some(pred) = dag.predecessor_of(position) {
                        self.apply_constraint(&mut items, position, pred);
                    }
                }
            }
            ResolutionStrategy::Topological => {
                for component in dag.components_in_order() {
                    if dag.is_cycle(&component) {
                        warnings.push(ResolutionWarning::Cycle {
                            items: component
                                .iter()
                                .map(|&position| items[position].item.id.clone())
                                .collect(),
                        });
                        continue;
                    }
                    let position = component[0];
                    if let Some(pred) = dag.predecessor_of(position) {
                        self.apply_constraint(&mut items, position, pred);
                    }
                }
            }
        }

        Resolution { items, warnings }
    }

    fn apply_constraint(&self, items: &mut [PlacedItem], position: usize, pred: usize) -> bool {
        let pred_end = items[pred].end;
        let placed = &mut items[position];
        if placed.item.start >= pred_end {
            return false;
        }

        debug!(
            item = %placed.item.id,
            from = %placed.item.start,
            to = %pred_end,
            "start moved after predecessor"
        );
        placed.item.start = pred_end;
        placed.end = compute_end_date(pred_end, placed.item.kind, self.calendar);
        true
    }
}
