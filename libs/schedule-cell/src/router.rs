use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Read-only schedule previews; no booking session required.
pub fn schedule_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{kind}/{provider_id}/dates", get(handlers::get_provider_dates))
        .route("/{kind}/{provider_id}/slots", get(handlers::get_provider_slots))
        .with_state(state)
}
