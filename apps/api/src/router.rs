use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::handlers::BookingContext;
use booking_cell::router::{booking_routes, customer_routes, directory_routes};
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CaafiCare booking API is running!" }))
        .nest("/directory", directory_routes(state.clone()))
        .nest("/schedule", schedule_routes(state.clone()))
        .nest("/bookings", booking_routes(BookingContext::new(state.clone())))
        .nest("/customers", customer_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::Value;
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_root_reports_liveness() {
        let app = create_router(TestConfig::default().to_arc());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"CaafiCare booking API is running!");
    }

    #[tokio::test]
    async fn test_unknown_booking_session_is_not_found() {
        let app = create_router(TestConfig::default().to_arc());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/bookings/00000000-0000-0000-0000-000000000000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("not found"));
    }
}
