use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use schedule_cell::models::ProviderKind;
use schedule_cell::services::format::{format_stored_date, format_stored_time};
use shared_config::AppConfig;
use shared_models::lenient;
use shared_remote::CaafiClient;

use crate::error::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    Pending,
    Approved,
    Canceled,
}

impl HistoryFilter {
    /// Status groups: "scheduled" counts as pending, "completed" as
    /// approved, both spellings of cancelled as canceled.
    pub fn matches(&self, status: Option<&str>) -> bool {
        let status = status.unwrap_or("").trim().to_lowercase();
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Pending => status == "pending" || status == "scheduled",
            HistoryFilter::Approved => status == "approved" || status == "completed",
            HistoryFilter::Canceled => status == "canceled" || status == "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareProvider {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppointmentRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "appointmentType", default)]
    pub appointment_type: Option<String>,
    #[serde(rename = "appointmentDate", default)]
    pub appointment_date: Option<String>,
    #[serde(rename = "appointmentTime", default)]
    pub appointment_time: Option<String>,
    #[serde(rename = "patientName", default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor: Option<CareProvider>,
    #[serde(default)]
    pub nurse: Option<CareProvider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counterpart {
    pub kind: ProviderKind,
    pub name: String,
    pub profession: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub status: String,
    pub appointment_type: Option<String>,
    pub patient_name: Option<String>,
    pub provider: Option<Counterpart>,
    pub date_label: String,
    pub time_label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryCounts {
    pub all: usize,
    pub pending: usize,
    pub approved: usize,
    pub canceled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub filter: HistoryFilter,
    pub counts: HistoryCounts,
    pub appointments: Vec<HistoryEntry>,
}

impl AppointmentRecord {
    /// Who the appointment is with; doctors always carry a `Dr.` prefix.
    pub fn counterpart(&self) -> Option<Counterpart> {
        if let Some(doctor) = &self.doctor {
            let name = if doctor.name.starts_with("Dr") {
                doctor.name.clone()
            } else {
                format!("Dr. {}", doctor.name)
            };
            return Some(Counterpart {
                kind: ProviderKind::Doctor,
                name,
                profession: doctor.profession.clone(),
                phone: doctor.phone.clone(),
            });
        }

        self.nurse.as_ref().map(|nurse| Counterpart {
            kind: ProviderKind::Nurse,
            name: nurse.name.clone(),
            profession: nurse.profession.clone(),
            phone: nurse.phone.clone(),
        })
    }

    fn to_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id.clone(),
            status: self
                .status
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Pending".to_string()),
            appointment_type: self.appointment_type.clone(),
            patient_name: self.patient_name.clone(),
            provider: self.counterpart(),
            date_label: format_stored_date(self.appointment_date.as_deref()),
            time_label: format_stored_time(self.appointment_time.as_deref()),
        }
    }
}

pub fn count_by_status(records: &[AppointmentRecord]) -> HistoryCounts {
    let count = |filter: HistoryFilter| records.iter().filter(|r| filter.matches(r.status.as_deref())).count();
    HistoryCounts {
        all: records.len(),
        pending: count(HistoryFilter::Pending),
        approved: count(HistoryFilter::Approved),
        canceled: count(HistoryFilter::Canceled),
    }
}

pub fn summarize(records: &[AppointmentRecord], filter: HistoryFilter) -> HistoryPage {
    HistoryPage {
        filter,
        counts: count_by_status(records),
        appointments: records
            .iter()
            .filter(|r| filter.matches(r.status.as_deref()))
            .map(AppointmentRecord::to_entry)
            .collect(),
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Vec<AppointmentRecord>>,
}

pub struct HistoryService {
    remote: CaafiClient,
}

impl HistoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            remote: CaafiClient::new(config),
        }
    }

    pub fn with_client(remote: CaafiClient) -> Self {
        Self { remote }
    }

    pub async fn history(&self, customer_id: &str, filter: HistoryFilter) -> Result<HistoryPage, BookingError> {
        let path = format!(
            "/api/appointments/history?customer_id={}",
            urlencoding::encode(customer_id)
        );
        let response: HistoryResponse = self.remote.request(Method::GET, &path, None).await?;

        if !response.success {
            warn!("History endpoint reported failure for customer {}", customer_id);
            return Err(BookingError::HistoryUnavailable);
        }

        let records = response.data.unwrap_or_default();
        info!("Loaded {} appointments for customer {}", records.len(), customer_id);
        Ok(summarize(&records, filter))
    }
}
