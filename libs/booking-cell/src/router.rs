use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::{self, BookingContext};

/// Booking sessions. Each session wraps one booking flow held in memory.
pub fn booking_routes(ctx: BookingContext) -> Router {
    Router::new()
        .route("/", post(handlers::create_booking))
        .route(
            "/{session_id}",
            get(handlers::get_booking).delete(handlers::delete_booking),
        )
        .route("/{session_id}/filters", put(handlers::update_filters))
        .route("/{session_id}/provider", put(handlers::select_provider))
        .route("/{session_id}/dates", get(handlers::page_dates))
        .route("/{session_id}/date", put(handlers::select_date))
        .route("/{session_id}/time", put(handlers::select_time))
        .route("/{session_id}/patient", patch(handlers::update_patient))
        .route("/{session_id}/payment", post(handlers::proceed_to_payment))
        .route("/{session_id}/payment/confirm", post(handlers::confirm_payment))
        .route("/{session_id}/retry", post(handlers::retry_booking))
        .route("/{session_id}/details", post(handlers::edit_details))
        .with_state(ctx)
}

/// Lookup lists for the booking forms.
pub fn directory_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/hospitals", get(handlers::list_hospitals))
        .route("/specialties", get(handlers::list_specialties))
        .route("/services", get(handlers::list_services))
        .route("/nurses", get(handlers::list_nurses))
        .route("/doctor-form", get(handlers::doctor_form))
        .with_state(state)
}

pub fn customer_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{customer_id}/appointments", get(handlers::get_customer_appointments))
        .with_state(state)
}
