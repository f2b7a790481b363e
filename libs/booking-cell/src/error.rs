use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use schedule_cell::models::ScheduleError;
use shared_models::error::AppError;
use shared_remote::RemoteError;

use crate::models::{BookingStage, FieldErrors};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Cannot {action} while {stage}")]
    InvalidTransition { stage: BookingStage, action: &'static str },

    #[error("Provider {0} is not in the current list")]
    UnknownProvider(String),

    #[error("Unknown nursing service: {0}")]
    UnknownService(String),

    #[error("{0} is not a bookable date")]
    DateUnavailable(NaiveDate),

    #[error("{} is not an available slot", .0.format("%H:%M"))]
    SlotUnavailable(NaiveTime),

    #[error("Booking details are incomplete")]
    Validation(FieldErrors),

    #[error("Failed to load appointment history")]
    HistoryUnavailable,

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Remote API error: {0}")]
    Remote(#[from] RemoteError),
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::SessionNotFound(_) => AppError::NotFound(e.to_string()),
            BookingError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            BookingError::UnknownProvider(_)
            | BookingError::UnknownService(_)
            | BookingError::DateUnavailable(_)
            | BookingError::SlotUnavailable(_) => AppError::BadRequest(e.to_string()),
            BookingError::Validation(ref errors) => {
                let fields: Vec<String> = errors
                    .keys()
                    .filter_map(|f| serde_json::to_value(f).ok())
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                AppError::ValidationError(format!("{}: {}", e, fields.join(", ")))
            }
            BookingError::HistoryUnavailable => AppError::ExternalService(e.to_string()),
            BookingError::Schedule(e) => e.into(),
            BookingError::Remote(e) => AppError::ExternalService(e.to_string()),
        }
    }
}
