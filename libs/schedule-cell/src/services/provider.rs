use tracing::{debug, info};

use shared_config::AppConfig;
use shared_remote::{CaafiClient, RemoteError};

use crate::models::{DoctorFilter, Provider, ProviderKind, ScheduleError};

pub struct ProviderService {
    remote: CaafiClient,
}

impl ProviderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            remote: CaafiClient::new(config),
        }
    }

    pub fn with_client(remote: CaafiClient) -> Self {
        Self { remote }
    }

    /// Fetch one provider record, including its raw `work_schedule`.
    pub async fn get_provider(&self, kind: ProviderKind, provider_id: &str) -> Result<Provider, ScheduleError> {
        debug!("Fetching {} record {}", kind, provider_id);

        match self.remote.get_data::<Provider>(&kind.record_path(provider_id)).await {
            Ok(provider) => Ok(provider),
            Err(RemoteError::Api { status: 404, .. }) => {
                Err(ScheduleError::ProviderNotFound(provider_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Doctors narrowed by consultation type, hospital and specialty.
    /// Unset filters are sent as empty parameters, which the API ignores.
    pub async fn list_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Provider>, ScheduleError> {
        let path = format!(
            "/api/appointment_doctors?appointmentType={}&hospitalId={}&specialty={}",
            urlencoding::encode(filter.appointment_type.as_deref().unwrap_or("")),
            urlencoding::encode(filter.hospital_id.as_deref().unwrap_or("")),
            urlencoding::encode(filter.specialty.as_deref().unwrap_or("")),
        );

        let doctors: Vec<Provider> = self.remote.get_data(&path).await?;
        info!("Loaded {} doctors for filter {:?}", doctors.len(), filter);
        Ok(doctors)
    }

    pub async fn list_active_nurses(&self) -> Result<Vec<Provider>, ScheduleError> {
        let nurses: Vec<Provider> = self.remote.get_data("/api/nurse?status=Active").await?;
        info!("Loaded {} active nurses", nurses.len());
        Ok(nurses)
    }
}

/// Case-insensitive substring match on the nurse's location. An empty
/// query keeps everyone.
pub fn filter_by_location<'a>(providers: &'a [Provider], location: &str) -> Vec<&'a Provider> {
    let needle = location.trim().to_lowercase();
    providers
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.location
                    .as_deref()
                    .map(|l| l.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}
