use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use schedule_cell::models::ProviderKind;
use schedule_cell::services::ProviderService;
use shared_config::AppConfig;
use shared_remote::CaafiClient;

use crate::error::BookingError;
use crate::models::{FetchOutcome, ProviderQuery};
use crate::services::directory::DirectoryService;
use crate::services::flow::BookingFlow;
use crate::services::submission::{AppointmentGateway, RemoteAppointmentGateway};

/// Drives a [`BookingFlow`] against the CaafiCare API.
///
/// The flow's lock is held only while the controller is read or mutated,
/// never across a request; fetch tickets sort out responses that arrive
/// after the customer has moved on.
pub struct BookingService {
    providers: ProviderService,
    directory: DirectoryService,
    gateway: Arc<dyn AppointmentGateway>,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            providers: ProviderService::new(config),
            directory: DirectoryService::new(config),
            gateway: Arc::new(RemoteAppointmentGateway::new(config)),
        }
    }

    pub fn with_parts(remote: CaafiClient, gateway: Arc<dyn AppointmentGateway>) -> Self {
        Self {
            providers: ProviderService::with_client(remote.clone()),
            directory: DirectoryService::with_client(remote),
            gateway,
        }
    }

    /// Re-fetch the provider list for the flow's current filters. `None`
    /// when the filters are not complete enough to fetch anything.
    #[instrument(skip(self, flow))]
    pub async fn refresh_providers(&self, flow: &Mutex<BookingFlow>) -> Option<FetchOutcome> {
        let (request, kind) = {
            let mut flow = flow.lock().await;
            (flow.request_provider_list(), flow.kind())
        };
        let (ticket, query) = request?;

        let result = match query {
            ProviderQuery::Doctors(filter) => self.providers.list_doctors(&filter).await,
            ProviderQuery::ActiveNurses => self.providers.list_active_nurses().await,
        }
        .map_err(|e| {
            warn!("Provider list request failed: {}", e);
            format!("Failed to load {}s", kind)
        });

        Some(flow.lock().await.apply_provider_list(ticket, result))
    }

    pub async fn load_services(&self, flow: &Mutex<BookingFlow>) {
        let listing = self.directory.services().await;
        let mut flow = flow.lock().await;
        flow.set_services(listing.items);
        if listing.notice.is_some() {
            flow.set_notice(listing.notice);
        }
    }

    /// Nurse sessions need the nurse list and the service catalogue; both
    /// load in parallel.
    pub async fn prepare(&self, flow: &Mutex<BookingFlow>) {
        let kind = flow.lock().await.kind();
        match kind {
            ProviderKind::Nurse => {
                let (outcome, _) = futures::join!(self.refresh_providers(flow), self.load_services(flow));
                debug!("Nurse session prepared: {:?}", outcome);
            }
            ProviderKind::Doctor => {
                debug!("Doctor session waits for a consultation type before listing doctors");
            }
        }
    }

    /// Select a provider and load its schedule. `today` starts the booking
    /// horizon.
    #[instrument(skip(self, flow))]
    pub async fn choose_provider(
        &self,
        flow: &Mutex<BookingFlow>,
        provider_id: &str,
        today: NaiveDate,
    ) -> Result<FetchOutcome, BookingError> {
        let (ticket, kind) = {
            let mut flow = flow.lock().await;
            (flow.select_provider(provider_id)?, flow.kind())
        };

        let result = self.providers.get_provider(kind, provider_id).await.map_err(|e| {
            warn!("Provider record request failed: {}", e);
            "Failed to load provider schedule".to_string()
        });

        Ok(flow.lock().await.apply_provider_record(ticket, result, today))
    }

    /// Payment acknowledged: post the draft and record the outcome.
    #[instrument(skip(self, flow))]
    pub async fn submit(&self, flow: &Mutex<BookingFlow>) -> Result<(), BookingError> {
        let (payload, kind) = {
            let mut flow = flow.lock().await;
            (flow.acknowledge_payment()?, flow.kind())
        };

        let outcome = self.gateway.submit(kind, &payload).await;

        flow.lock().await.complete_submission(outcome)
    }
}
