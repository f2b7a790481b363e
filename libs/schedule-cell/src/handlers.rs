use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ProviderKind, ScheduleError};
use crate::services::{
    expander::{expand_available_dates, expand_time_slots},
    provider::ProviderService,
    window::{DateWindow, DATE_WINDOW_SIZE},
};

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    pub offset: Option<usize>,
    /// Overrides "today"; mainly for reproducible previews.
    pub reference: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::ProviderNotFound(id) => AppError::NotFound(format!("Provider {} not found", id)),
            ScheduleError::Remote(e) => AppError::ExternalService(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

pub async fn get_provider_dates(
    State(state): State<Arc<AppConfig>>,
    Path((kind, provider_id)): Path<(ProviderKind, String)>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(&state);
    let provider = provider_service.get_provider(kind, &provider_id).await?;

    let reference = query.reference.unwrap_or_else(|| Local::now().date_naive());
    let schedule = provider.schedule();
    let dates = expand_available_dates(schedule.as_ref(), reference, state.booking_horizon_days);

    info!("{} {} has {} bookable dates from {}", kind, provider_id, dates.len(), reference);

    let window = DateWindow::at(query.offset.unwrap_or(0), DATE_WINDOW_SIZE);

    Ok(Json(json!({
        "provider_id": provider.id,
        "kind": kind,
        "available": !dates.is_empty(),
        "page": window.page(&dates),
    })))
}

pub async fn get_provider_slots(
    State(state): State<Arc<AppConfig>>,
    Path((kind, provider_id)): Path<(ProviderKind, String)>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(&state);
    let provider = provider_service.get_provider(kind, &provider_id).await?;

    let schedule = provider.schedule();
    let slots = expand_time_slots(schedule.as_ref(), query.date, state.slot_step_minutes);

    Ok(Json(json!({
        "provider_id": provider.id,
        "kind": kind,
        "date": query.date,
        "available": !slots.is_empty(),
        "slots": slots,
    })))
}
