use async_trait::async_trait;
use tracing::{error, info, warn};

use schedule_cell::models::ProviderKind;
use shared_config::AppConfig;
use shared_remote::CaafiClient;

use crate::models::{BookingPayload, SubmissionOutcome, SubmitResponse};

pub fn submission_path(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Doctor => "/api/appointment",
        ProviderKind::Nurse => "/api/nurses_appointment",
    }
}

/// Where finished bookings are sent.
#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    async fn submit(&self, kind: ProviderKind, payload: &BookingPayload) -> SubmissionOutcome;
}

pub struct RemoteAppointmentGateway {
    remote: CaafiClient,
}

impl RemoteAppointmentGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            remote: CaafiClient::new(config),
        }
    }

    pub fn with_client(remote: CaafiClient) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl AppointmentGateway for RemoteAppointmentGateway {
    async fn submit(&self, kind: ProviderKind, payload: &BookingPayload) -> SubmissionOutcome {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => {
                error!("Could not encode booking payload: {}", e);
                return SubmissionOutcome::Rejected(None);
            }
        };

        match self.remote.post::<SubmitResponse>(submission_path(kind), &body).await {
            Ok(response) if response.success => {
                info!("{} appointment created for customer {}", kind, payload.customer_id);
                SubmissionOutcome::Accepted(response.data)
            }
            Ok(response) => {
                warn!("{} appointment refused: {:?}", kind, response.error);
                SubmissionOutcome::Rejected(response.error)
            }
            Err(e) => {
                warn!("{} appointment request failed: {}", kind, e);
                SubmissionOutcome::Rejected(e.server_message())
            }
        }
    }
}
