use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use schedule_cell::models::{hhmm, ProviderKind};
use schedule_cell::services::{AvailabilitySource, ScheduleAvailability};
use shared_config::AppConfig;
use shared_models::auth::CustomerIdentity;
use shared_models::error::AppError;

use crate::error::BookingError;
use crate::models::{BookingStage, FilterUpdate, PatientUpdate};
use crate::services::booking::BookingService;
use crate::services::directory::DirectoryService;
use crate::services::flow::{BookingFlow, FlowSettings};
use crate::services::history::{HistoryFilter, HistoryService};
use crate::services::sessions::SessionStore;

// ==============================================================================
// STATE
// ==============================================================================

/// Shared state of the booking routes.
#[derive(Clone)]
pub struct BookingContext {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
    pub service: Arc<BookingService>,
    pub availability: Arc<dyn AvailabilitySource>,
}

impl BookingContext {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let service = Arc::new(BookingService::new(&config));
        Self::with_parts(config, service, Arc::new(ScheduleAvailability))
    }

    pub fn with_parts(
        config: Arc<AppConfig>,
        service: Arc<BookingService>,
        availability: Arc<dyn AvailabilitySource>,
    ) -> Self {
        Self {
            config: config.clone(),
            sessions: SessionStore::with_ttl(config.session_ttl()),
            service,
            availability,
        }
    }
}

// ==============================================================================
// REQUEST BODIES & QUERIES
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub kind: ProviderKind,
    pub customer: CustomerIdentity,
}

#[derive(Debug, Deserialize)]
pub struct SelectProviderRequest {
    pub provider_id: String,
    /// Overrides "today" as the start of the booking horizon.
    pub reference: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SelectTimeRequest {
    #[serde(deserialize_with = "hhmm::deserialize")]
    pub time: NaiveTime,
    /// Set for the post-midnight part of a shift that wraps past 24:00.
    #[serde(default)]
    pub next_day: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStep {
    Next,
    Previous,
}

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    pub step: Option<DateStep>,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<HistoryFilter>,
}

fn session_json(session_id: Uuid, flow: &BookingFlow) -> Json<Value> {
    Json(json!({
        "session_id": session_id,
        "booking": flow.view(),
    }))
}

// ==============================================================================
// BOOKING SESSION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_booking(
    State(ctx): State<BookingContext>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let flow = BookingFlow::new(
        request.kind,
        request.customer,
        FlowSettings::from_config(&ctx.config),
        Arc::clone(&ctx.availability),
    );
    let (session_id, shared) = ctx.sessions.insert(flow).await;
    ctx.service.prepare(&shared).await;

    let flow = shared.lock().await;
    info!("Customer {} started a {} booking ({})", flow.customer().id, flow.kind(), session_id);
    Ok((StatusCode::CREATED, session_json(session_id, &flow)))
}

pub async fn get_booking(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let flow = shared.lock().await;
    Ok(session_json(session_id, &flow))
}

pub async fn delete_booking(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    shared.lock().await.cancel()?;
    ctx.sessions.remove(session_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking discarded"
    })))
}

pub async fn update_filters(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
    Json(update): Json<FilterUpdate>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;

    let refetch = shared.lock().await.update_filters(update)?;
    if refetch {
        ctx.service.refresh_providers(&shared).await;
    }

    let flow = shared.lock().await;
    Ok(session_json(session_id, &flow))
}

pub async fn select_provider(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let today = request.reference.unwrap_or_else(|| Local::now().date_naive());

    ctx.service
        .choose_provider(&shared, &request.provider_id, today)
        .await?;

    let flow = shared.lock().await;
    Ok(session_json(session_id, &flow))
}

pub async fn page_dates(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;

    let page = match query.step {
        Some(DateStep::Next) => flow.next_dates(),
        Some(DateStep::Previous) => flow.previous_dates(),
        None => flow.date_page(),
    };

    Ok(Json(json!({
        "session_id": session_id,
        "stage": flow.stage(),
        "page": page,
    })))
}

pub async fn select_date(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectDateRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;
    flow.select_date(request.date)?;
    Ok(session_json(session_id, &flow))
}

pub async fn select_time(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectTimeRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;
    flow.select_slot(request.time, request.next_day)?;
    Ok(session_json(session_id, &flow))
}

pub async fn update_patient(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
    Json(update): Json<PatientUpdate>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;
    flow.update_patient(update)?;
    Ok(session_json(session_id, &flow))
}

/// Field errors come back inside the session view with a 422, never as a
/// bare error body.
pub async fn proceed_to_payment(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;

    let status = match flow.proceed_to_payment() {
        Ok(()) => StatusCode::OK,
        Err(BookingError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Err(e) => return Err(e.into()),
    };
    Ok((status, session_json(session_id, &flow)))
}

pub async fn confirm_payment(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    ctx.service.submit(&shared).await?;

    let flow = shared.lock().await;
    let body = session_json(session_id, &flow);
    if flow.stage() == BookingStage::Succeeded {
        drop(flow);
        if let Err(e) = ctx.sessions.remove(session_id).await {
            info!("Booked session already closed: {}", e);
        }
    }
    Ok(body)
}

pub async fn retry_booking(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;
    flow.retry()?;
    Ok(session_json(session_id, &flow))
}

pub async fn edit_details(
    State(ctx): State<BookingContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = ctx.sessions.get(session_id).await?;
    let mut flow = shared.lock().await;
    flow.back_to_details()?;
    Ok(session_json(session_id, &flow))
}

// ==============================================================================
// DIRECTORY HANDLERS
// ==============================================================================

pub async fn list_hospitals(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let directory = DirectoryService::new(&state);
    Json(json!(directory.hospitals().await))
}

pub async fn list_specialties(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let directory = DirectoryService::new(&state);
    Json(json!(directory.specialties().await))
}

pub async fn list_services(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let directory = DirectoryService::new(&state);
    Json(json!(directory.services().await))
}

pub async fn list_nurses(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<LocationQuery>,
) -> Json<Value> {
    let directory = DirectoryService::new(&state);
    Json(json!(directory.nurses(query.location.as_deref()).await))
}

pub async fn doctor_form(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let directory = DirectoryService::new(&state);
    let (hospitals, specialties) = directory.doctor_form().await;

    Json(json!({
        "hospitals": hospitals,
        "specialties": specialties,
    }))
}

// ==============================================================================
// CUSTOMER HANDLERS
// ==============================================================================

pub async fn get_customer_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(customer_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let history_service = HistoryService::new(&state);
    let page = history_service
        .history(&customer_id, query.status.unwrap_or_default())
        .await?;

    Ok(Json(json!(page)))
}
