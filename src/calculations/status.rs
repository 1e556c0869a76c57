use crate::item::{ItemKind, Status};
use chrono::NaiveDate;

/// Position of an item relative to `today`, derived from dates alone.
pub fn classify(start: NaiveDate, end: NaiveDate, kind: ItemKind, today: NaiveDate) -> Status {
    if end < today {
        if kind.is_milestone() {
            Status::Completed
        } else {
            Status::Late
        }
    } else if start <= today && today < end {
        Status::Started
    } else {
        Status::NotStarted
    }
}
