use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
};
use chrono::Duration;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::handlers::*;
use schedule_cell::models::*;
use schedule_cell::router::schedule_routes;
use schedule_cell::services::provider::ProviderService;
use shared_models::error::AppError;
use shared_utils::test_utils::{reference_monday, MockCaafiResponses, TestConfig};

async fn mount_doctor(mock_server: &MockServer, id: u64, schedule: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/doctor/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": MockCaafiResponses::doctor_response(id, "Amina Warsame", schedule)
        })))
        .mount(mock_server)
        .await;
}

// ==============================================================================
// PROVIDER SERVICE
// ==============================================================================

#[tokio::test]
async fn test_get_provider_reads_encoded_schedule() {
    let mock_server = MockServer::start().await;
    let encoded = MockCaafiResponses::monday_morning_schedule().to_string();
    mount_doctor(&mock_server, 12, json!(encoded)).await;

    let config = TestConfig::with_api_url(mock_server.uri()).to_app_config();
    let service = ProviderService::new(&config);

    let doctor = service.get_provider(ProviderKind::Doctor, "12").await.unwrap();

    assert_eq!(doctor.id, "12");
    assert_eq!(doctor.hospital_id.as_deref(), Some("3"));
    assert_eq!(doctor.card_price, Some(10.0));
    assert_eq!(doctor.display_name(ProviderKind::Doctor), "Dr. Amina Warsame");
    let schedule = doctor.schedule().expect("schedule decodes");
    assert!(schedule.monday.enabled);
    assert!(!schedule.tuesday.enabled);
}

#[tokio::test]
async fn test_get_provider_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nurse/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Nurse not found"})))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_api_url(mock_server.uri()).to_app_config();
    let result = ProviderService::new(&config)
        .get_provider(ProviderKind::Nurse, "77")
        .await;

    assert_matches!(result, Err(ScheduleError::ProviderNotFound(id)) if id == "77");
}

#[tokio::test]
async fn test_list_doctors_sends_filters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/appointment_doctors"))
        .and(query_param("appointmentType", "Video Consulting"))
        .and(query_param("hospitalId", "3"))
        .and(query_param("specialty", "Cardiology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [MockCaafiResponses::doctor_response(12, "Dr. Amina Warsame", json!(null))]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_api_url(mock_server.uri()).to_app_config();
    let filter = DoctorFilter {
        appointment_type: Some("Video Consulting".to_string()),
        hospital_id: Some("3".to_string()),
        specialty: Some("Cardiology".to_string()),
    };

    let doctors = ProviderService::new(&config).list_doctors(&filter).await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].display_name(ProviderKind::Doctor), "Dr. Amina Warsame");
    assert!(doctors[0].schedule().is_none());
}

#[tokio::test]
async fn test_list_active_nurses() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nurse"))
        .and(query_param("status", "Active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                MockCaafiResponses::nurse_response(5, "Faadumo Ali", "Hodan", json!(null)),
                MockCaafiResponses::nurse_response(6, "Sahra Nur", "Hargeisa", json!(null))
            ]
        })))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_api_url(mock_server.uri()).to_app_config();
    let nurses = ProviderService::new(&config).list_active_nurses().await.unwrap();

    assert_eq!(nurses.len(), 2);
    assert_eq!(nurses[1].location.as_deref(), Some("Hargeisa"));
}

#[tokio::test]
async fn test_remote_failure_surfaces_as_remote_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nurse"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_api_url(mock_server.uri()).to_app_config();
    let result = ProviderService::new(&config).list_active_nurses().await;

    assert_matches!(result, Err(ScheduleError::Remote(_)));
}

// ==============================================================================
// HANDLERS
// ==============================================================================

#[tokio::test]
async fn test_get_provider_dates_pages_bookable_dates() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server, 12, MockCaafiResponses::full_week_schedule()).await;
    let state = TestConfig::with_api_url(mock_server.uri()).to_arc();

    let result = get_provider_dates(
        State(state),
        Path((ProviderKind::Doctor, "12".to_string())),
        Query(DatesQuery {
            offset: Some(3),
            reference: Some(reference_monday()),
        }),
    )
    .await;

    let body = result.unwrap().0;
    assert_eq!(body["available"], true);
    assert_eq!(body["page"]["total"], 14);
    assert_eq!(body["page"]["offset"], 3);
    assert_eq!(body["page"]["has_previous"], true);
    assert_eq!(body["page"]["dates"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["page"]["dates"][0]["date"],
        (reference_monday() + Duration::days(3)).to_string()
    );
}

#[tokio::test]
async fn test_get_provider_dates_without_schedule() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server, 12, json!("not json at all")).await;
    let state = TestConfig::with_api_url(mock_server.uri()).to_arc();

    let body = get_provider_dates(
        State(state),
        Path((ProviderKind::Doctor, "12".to_string())),
        Query(DatesQuery {
            offset: None,
            reference: Some(reference_monday()),
        }),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(body["available"], false);
    assert_eq!(body["page"]["total"], 0);
}

#[tokio::test]
async fn test_get_provider_slots_for_monday() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server, 12, MockCaafiResponses::monday_morning_schedule()).await;
    let state = TestConfig::with_api_url(mock_server.uri()).to_arc();

    let body = get_provider_slots(
        State(state),
        Path((ProviderKind::Doctor, "12".to_string())),
        Query(SlotsQuery { date: reference_monday() }),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(body["available"], true);
    assert_eq!(body["slots"]["morning"][0]["display"], "8:00 AM");
    assert_eq!(body["slots"]["morning"][1]["time"], "08:15");
    assert_eq!(body["slots"]["afternoon"], json!([]));
}

#[tokio::test]
async fn test_get_provider_slots_unknown_provider() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&mock_server)
        .await;
    let state = TestConfig::with_api_url(mock_server.uri()).to_arc();

    let result = get_provider_slots(
        State(state),
        Path((ProviderKind::Doctor, "404".to_string())),
        Query(SlotsQuery { date: reference_monday() }),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn test_schedule_routes_reject_unknown_kind() {
    let state = TestConfig::default().to_arc();
    let app = schedule_routes(Arc::clone(&state));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/pharmacist/1/dates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_routes_serve_slots() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server, 12, MockCaafiResponses::monday_morning_schedule()).await;
    let app = schedule_routes(TestConfig::with_api_url(mock_server.uri()).to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/doctor/12/slots?date=2025-06-16")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
