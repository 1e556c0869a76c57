use crate::item::ScheduledItem;
use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

pub const COLUMNS: [&str; 8] = [
    "id",
    "kind",
    "start",
    "end",
    "duration_hours",
    "predecessor",
    "status",
    "span_days",
];

/// Tabular view of a finished run, one row per item in output order.
pub fn scheduled_items_to_dataframe(items: &[ScheduledItem]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(COLUMNS.len());

    let ids: Vec<&str> = items.iter().map(|i| i.id()).collect();
    columns.push(Series::new(PlSmallStr::from_static("id"), ids).into_column());

    let kinds: Vec<&str> = items.iter().map(|i| i.item.kind.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("kind"), kinds).into_column());

    let starts: Vec<i32> = items.iter().map(|i| date_to_i32(i.start())).collect();
    columns.push(date_series("start", starts)?.into_column());

    let ends: Vec<i32> = items.iter().map(|i| date_to_i32(i.end)).collect();
    columns.push(date_series("end", ends)?.into_column());

    let hours: Vec<f64> = items.iter().map(|i| i.item.kind.duration_hours()).collect();
    columns.push(Series::new(PlSmallStr::from_static("duration_hours"), hours).into_column());

    let predecessors: Vec<Option<&str>> =
        items.iter().map(|i| i.item.predecessor.as_deref()).collect();
    columns.push(
        Series::new(PlSmallStr::from_static("predecessor"), predecessors).into_column(),
    );

    let statuses: Vec<&str> = items.iter().map(|i| i.status.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("status"), statuses).into_column());

    let spans: Vec<i64> = items.iter().map(|i| i.span_days()).collect();
    columns.push(Series::new(PlSmallStr::from_static("span_days"), spans).into_column());

    DataFrame::new(columns)
}

fn date_series(name: &'static str, days: Vec<i32>) -> PolarsResult<Series> {
    Series::new(PlSmallStr::from_static(name), days).cast(&DataType::Date)
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}
