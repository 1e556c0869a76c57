use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    CalendarError, InvalidItemError, ItemRecord, Schedule, ScheduleRun, WorkCalendarConfig,
};

#[derive(Clone)]
pub struct AppState {
    schedule: Arc<RwLock<Schedule>>,
}

impl AppState {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule: Arc::new(RwLock::new(schedule)),
        }
    }

    fn schedule(&self) -> Arc<RwLock<Schedule>> {
        self.schedule.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    today: Option<NaiveDate>,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<InvalidItemError> for ApiError {
    fn from(value: InvalidItemError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<CalendarError> for ApiError {
    fn from(value: CalendarError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/schedule", get(compute_schedule))
        .route("/calendar", get(get_calendar).put(update_calendar))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, schedule: Schedule) -> std::io::Result<()> {
    let state = AppState::new(schedule);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<ItemRecord>> {
    let schedule = state.schedule();
    let records = schedule.read().records();
    Json(records)
}

async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemRecord>, ApiError> {
    let schedule = state.schedule();
    let guard = schedule.read();
    guard
        .find_item(&item_id)
        .map(|item| Json(ItemRecord::from(item)))
        .ok_or_else(|| ApiError::not_found(format!("item {item_id} not found")))
}

async fn create_item(
    State(state): State<AppState>,
    Json(record): Json<ItemRecord>,
) -> Result<(StatusCode, Json<ItemRecord>), ApiError> {
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let item = record.validate()?;
    if guard.find_item(&item.id).is_some() {
        return Err(ApiError::Conflict(format!("item {} already exists", item.id)));
    }
    guard.insert_item(record)?;
    Ok((StatusCode::CREATED, Json(ItemRecord::from(&item))))
}

async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(record): Json<ItemRecord>,
) -> Result<Json<ItemRecord>, ApiError> {
    if record.id.trim() != item_id {
        return Err(ApiError::invalid(
            "item id in payload does not match path parameter",
        ));
    }
    let schedule = state.schedule();
    let mut guard = schedule.write();
    if guard.find_item(&item_id).is_none() {
        return Err(ApiError::not_found(format!("item {item_id} not found")));
    }
    let item = record.validate()?;
    guard.upsert_item(record)?;
    Ok(Json(ItemRecord::from(&item)))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let schedule = state.schedule();
    let removed = schedule.write().delete_item(&item_id);
    if !removed {
        return Err(ApiError::not_found(format!("item {item_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn compute_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Json<ScheduleRun> {
    let today = query
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let schedule = state.schedule();
    let run = schedule.read().compute(today);
    Json(run)
}

async fn get_calendar(State(state): State<AppState>) -> Json<WorkCalendarConfig> {
    let schedule = state.schedule();
    let config = schedule.read().calendar_config();
    Json(config)
}

async fn update_calendar(
    State(state): State<AppState>,
    Json(config): Json<WorkCalendarConfig>,
) -> Result<Json<WorkCalendarConfig>, ApiError> {
    let schedule = state.schedule();
    let mut guard = schedule.write();
    guard.set_calendar_from_config(&config)?;
    Ok(Json(guard.calendar_config()))
}
