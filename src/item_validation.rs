use crate::calculations::duration::{MAX_DURATION_HOURS, is_supported_start};
use crate::item::{Item, ItemRecord};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidItemReason {
    #[error("id is empty")]
    EmptyId,
    #[error("id is used by another item")]
    DuplicateId,
    #[error("duration {0} is negative")]
    NegativeDuration(f64),
    #[error("duration {0} is not a finite number")]
    NonFiniteDuration(f64),
    #[error("duration '{0}' is not a number")]
    UnparseableDuration(String),
    #[error("duration {0} exceeds the maximum of {max} hours", max = MAX_DURATION_HOURS)]
    DurationTooLarge(f64),
    #[error("start date {0} is outside the supported years 1 to 9999")]
    StartOutOfRange(NaiveDate),
    #[error("start date is missing")]
    MissingStart,
    #[error("start date '{0}' is not a valid date")]
    UnparseableStart(String),
}

/// One rejected item. `item` is the id when there is one, otherwise a row label.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("item '{item}': {reason}")]
pub struct InvalidItemError {
    pub item: String,
    pub reason: InvalidItemReason,
}

impl InvalidItemError {
    pub fn new(item: impl Into<String>, reason: InvalidItemReason) -> Self {
        Self {
            item: item.into(),
            reason,
        }
    }
}

/// Every invalid item found in a batch, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(pub Vec<InvalidItemError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[InvalidItemError] {
        &self.0
    }

    pub fn push(&mut self, error: InvalidItemError) {
        self.0.push(error);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid item(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<InvalidItemError> for ValidationErrors {
    fn from(error: InvalidItemError) -> Self {
        Self(vec![error])
    }
}

pub fn validate_record(record: &ItemRecord) -> Result<(), InvalidItemError> {
    let id = record.id.trim();
    if id.is_empty() {
        return Err(InvalidItemError::new(
            record.id.clone(),
            InvalidItemReason::EmptyId,
        ));
    }

    if !record.duration_hours.is_finite() {
        return Err(InvalidItemError::new(
            id,
            InvalidItemReason::NonFiniteDuration(record.duration_hours),
        ));
    }

    if record.duration_hours < 0.0 {
        return Err(InvalidItemError::new(
            id,
            InvalidItemReason::NegativeDuration(record.duration_hours),
        ));
    }

    if record.duration_hours > MAX_DURATION_HOURS {
        return Err(InvalidItemError::new(
            id,
            InvalidItemReason::DurationTooLarge(record.duration_hours),
        ));
    }

    if !is_supported_start(record.start) {
        return Err(InvalidItemError::new(
            id,
            InvalidItemReason::StartOutOfRange(record.start),
        ));
    }

    Ok(())
}

/// Validate a batch, keeping input order. Ids must be unique across the batch.
pub fn validate_records(records: &[ItemRecord]) -> Result<Vec<Item>, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut seen_ids = HashSet::with_capacity(records.len());
    let mut items = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        match record.validate() {
            Ok(item) => {
                if !seen_ids.insert(item.id.clone()) {
                    errors.push(InvalidItemError::new(
                        item.id,
                        InvalidItemReason::DuplicateId,
                    ));
                    continue;
                }
                items.push(item);
            }
            Err(mut err) => {
                if err.item.trim().is_empty() {
                    err.item = format!("#{}", idx + 1);
                }
                errors.push(err);
            }
        }
    }

    if errors.is_empty() {
        Ok(items)
    } else {
        Err(errors)
    }
}
