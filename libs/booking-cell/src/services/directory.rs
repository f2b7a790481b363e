use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use schedule_cell::models::{Provider, ProviderKind};
use schedule_cell::services::filter_by_location;
use shared_config::AppConfig;
use shared_remote::CaafiClient;

use crate::models::{Hospital, NursingService, ProviderSummary};

/// A lookup list for the booking form. A failed load yields no items and a
/// notice for the customer instead of an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub notice: Option<String>,
}

impl<T> Listing<T> {
    fn from_result(result: Result<Vec<T>>, what: &str) -> Self {
        match result {
            Ok(items) => Self { items, notice: None },
            Err(e) => {
                warn!("Failed to load {}: {:#}", what, e);
                Self {
                    items: Vec::new(),
                    notice: Some(format!("Failed to load {}", what)),
                }
            }
        }
    }
}

pub struct DirectoryService {
    remote: CaafiClient,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            remote: CaafiClient::new(config),
        }
    }

    pub fn with_client(remote: CaafiClient) -> Self {
        Self { remote }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let items: Vec<T> = self
            .remote
            .get_data(path)
            .await
            .with_context(|| format!("GET {}", path))?;
        Ok(items)
    }

    pub async fn hospitals(&self) -> Listing<Hospital> {
        Listing::from_result(self.fetch_list("/api/hospitals").await, "hospitals")
    }

    pub async fn specialties(&self) -> Listing<String> {
        Listing::from_result(self.fetch_list("/api/doctor/specialties").await, "specialties")
    }

    pub async fn services(&self) -> Listing<NursingService> {
        Listing::from_result(self.fetch_list("/api/services").await, "nursing services")
    }

    /// Active nurses, optionally narrowed by location.
    pub async fn nurses(&self, location: Option<&str>) -> Listing<ProviderSummary> {
        let listing = Listing::from_result(self.fetch_list::<Provider>("/api/nurse?status=Active").await, "nurses");
        let items = filter_by_location(&listing.items, location.unwrap_or(""))
            .into_iter()
            .map(|p| ProviderSummary::from_provider(p, ProviderKind::Nurse, None))
            .collect();

        Listing {
            items,
            notice: listing.notice,
        }
    }

    /// Hospitals and specialties for the doctor form, loaded together.
    pub async fn doctor_form(&self) -> (Listing<Hospital>, Listing<String>) {
        let (hospitals, specialties) = futures::join!(self.hospitals(), self.specialties());
        info!(
            "Doctor form lookups: {} hospitals, {} specialties",
            hospitals.items.len(),
            specialties.items.len()
        );
        (hospitals, specialties)
    }
}
