use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::CustomerIdentity;

pub struct TestConfig {
    pub api_url: String,
    pub horizon_days: u32,
    pub slot_step_minutes: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8089".to_string(),
            horizon_days: 14,
            slot_step_minutes: 15,
        }
    }
}

impl TestConfig {
    /// Config pointing at a mock server (`MockServer::uri()`).
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            caaficare_api_url: self.api_url.clone(),
            booking_horizon_days: self.horizon_days,
            slot_step_minutes: self.slot_step_minutes,
            success_redirect_ms: 2500,
            remote_timeout_secs: 5,
            session_ttl_secs: 1800,
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn test_customer() -> CustomerIdentity {
    CustomerIdentity::new("501", "Hodan Abdi", "252615000111")
}

/// 2025-06-16 is a Monday.
pub fn reference_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 16).expect("valid date")
}

pub struct MockCaafiResponses;

impl MockCaafiResponses {
    /// Monday 08:00-08:30 morning shift only; every other day disabled.
    pub fn monday_morning_schedule() -> Value {
        json!({
            "monday": {
                "enabled": true,
                "shifts": [
                    {"id": "morning", "label": "Morning", "enabled": true, "start_time": "08:00", "end_time": "08:30"},
                    {"id": "afternoon", "label": "Afternoon", "enabled": false, "start_time": "13:00", "end_time": "17:00"}
                ]
            },
            "tuesday": {"enabled": false, "shifts": []},
            "wednesday": {"enabled": false, "shifts": []},
            "thursday": {"enabled": false, "shifts": []},
            "friday": {"enabled": false, "shifts": []},
            "saturday": {"enabled": false, "shifts": []},
            "sunday": {"enabled": false, "shifts": []}
        })
    }

    /// Every weekday enabled with the apply-form's three default shifts.
    pub fn full_week_schedule() -> Value {
        let day = json!({
            "enabled": true,
            "shifts": [
                {"id": "morning", "enabled": true, "start": "08:00", "end": "12:00"},
                {"id": "afternoon", "enabled": true, "start": "13:00", "end": "17:00"},
                {"id": "evening", "enabled": true, "start": "18:00", "end": "22:00"}
            ]
        });
        json!({
            "monday": day, "tuesday": day, "wednesday": day, "thursday": day,
            "friday": day, "saturday": day, "sunday": day
        })
    }

    pub fn doctor_response(id: u64, name: &str, work_schedule: Value) -> Value {
        json!({
            "id": id,
            "name": name,
            "profession": "General Physician",
            "phone": "252617000000",
            "hospital_id": 3,
            "card_price": "10",
            "appointment_price": 15,
            "availability_status": "Available",
            "work_schedule": work_schedule
        })
    }

    pub fn nurse_response(id: u64, name: &str, location: &str, work_schedule: Value) -> Value {
        json!({
            "id": id,
            "name": name,
            "location": location,
            "phone": "252618000000",
            "work_schedule": work_schedule
        })
    }

    pub fn hospitals_response() -> Value {
        json!({
            "data": [
                {"id": 3, "name": "Banadir Hospital", "location": "Mogadishu"},
                {"id": 4, "name": "Hargeisa Group Hospital", "location": "Hargeisa"}
            ]
        })
    }

    pub fn specialties_response() -> Value {
        json!({ "data": ["Cardiology", "Pediatrics", "Dermatology"] })
    }

    pub fn services_response() -> Value {
        json!([
            {"id": 1, "serviceName": "Wound Dressing", "price": "12"},
            {"id": 2, "serviceName": "Injection at Home", "price": 8}
        ])
    }

    pub fn submit_success() -> Value {
        json!({ "success": true, "data": { "id": 9001, "status": "Scheduled" } })
    }

    pub fn submit_rejected(message: &str) -> Value {
        json!({ "success": false, "error": message })
    }
}
