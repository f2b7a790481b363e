use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use schedule_cell::models::{Provider, ProviderKind, SlotBucket, SlotBuckets};
use schedule_cell::services::DatePage;
use shared_models::lenient;

use crate::services::payment::PaymentInstructions;

// ==============================================================================
// DRAFT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsultationType {
    #[serde(rename = "Video Consulting")]
    VideoConsulting,
    #[serde(rename = "Appointment")]
    InPerson,
    #[serde(rename = "Nursing")]
    Nursing,
}

impl ConsultationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationType::VideoConsulting => "Video Consulting",
            ConsultationType::InPerson => "Appointment",
            ConsultationType::Nursing => "Nursing",
        }
    }
}

impl fmt::Display for ConsultationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Patient fields exactly as typed. `age` stays raw text until validation
/// so a bad entry can be reported against the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientDetails {
    pub name: String,
    pub phone: String,
    pub age: String,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NursingService {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename(deserialize = "serviceName"), alias = "name", default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_price")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Everything the customer has entered so far. Lives only inside one
/// [`crate::services::flow::BookingFlow`]; dropped on success or cancel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingDraft {
    pub patient: PatientDetails,
    pub consultation_type: Option<ConsultationType>,
    pub hospital_id: Option<String>,
    pub specialty: Option<String>,
    pub service: Option<NursingService>,
    pub location: Option<String>,
    pub address: String,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub bucket: Option<SlotBucket>,
    pub next_day: bool,
    pub notes: String,
    pub price: Option<f64>,
}

impl BookingDraft {
    pub(crate) fn clear_time(&mut self) {
        self.time = None;
        self.bucket = None;
        self.next_day = false;
    }

    pub(crate) fn clear_provider(&mut self) {
        self.provider_id = None;
        self.provider_name = None;
        self.date = None;
        self.clear_time();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PatientName,
    PatientPhone,
    PatientAge,
    PatientGender,
    ConsultationType,
    Hospital,
    Service,
    Provider,
    Date,
    Time,
    Address,
}

pub type FieldErrors = BTreeMap<Field, String>;

// ==============================================================================
// FLOW STATE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStage {
    SelectingProvider,
    SelectingSchedule,
    NoAvailability,
    SelectingDate,
    SelectingTime,
    FillingPatientDetails,
    AwaitingPayment,
    Submitting,
    Succeeded,
    Failed,
}

impl BookingStage {
    /// Stages in which draft fields may still change.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            BookingStage::SelectingProvider
                | BookingStage::SelectingSchedule
                | BookingStage::NoAvailability
                | BookingStage::SelectingDate
                | BookingStage::SelectingTime
                | BookingStage::FillingPatientDetails
        )
    }
}

impl fmt::Display for BookingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStage::SelectingProvider => "selecting a provider",
            BookingStage::SelectingSchedule => "loading the provider schedule",
            BookingStage::NoAvailability => "no availability",
            BookingStage::SelectingDate => "selecting a date",
            BookingStage::SelectingTime => "selecting a time",
            BookingStage::FillingPatientDetails => "filling patient details",
            BookingStage::AwaitingPayment => "awaiting payment",
            BookingStage::Submitting => "submitting",
            BookingStage::Succeeded => "succeeded",
            BookingStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Generation stamp handed out with each fetch. A response is applied only
/// while its ticket is still the latest one issued for that fetch kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    Applied,
    Discarded,
}

/// What the provider list should be fetched with.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderQuery {
    Doctors(schedule_cell::models::DoctorFilter),
    ActiveNurses,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

/// Partial patch of the patient section; absent keys are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterUpdate {
    pub consultation_type: Option<ConsultationType>,
    pub hospital_id: Option<String>,
    pub specialty: Option<String>,
    pub service_id: Option<String>,
    pub location: Option<String>,
}

// ==============================================================================
// SUBMISSION
// ==============================================================================

/// Body posted to `/api/appointment` or `/api/nurses_appointment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingPayload {
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(rename = "patientPhone")]
    pub patient_phone: String,
    #[serde(rename = "patientAge")]
    pub patient_age: u32,
    #[serde(rename = "patientGender")]
    pub patient_gender: Gender,
    #[serde(rename = "appointmentType")]
    pub appointment_type: ConsultationType,
    #[serde(rename = "appointmentDate")]
    pub appointment_date: NaiveDate,
    pub shift: String,
    #[serde(rename = "appointmentTime")]
    pub appointment_time: String,
    pub status: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted(Option<Value>),
    /// Server-supplied reason, if any.
    Rejected(Option<String>),
}

// ==============================================================================
// VIEW
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
}

impl ProviderSummary {
    pub fn from_provider(provider: &Provider, kind: ProviderKind, price: Option<f64>) -> Self {
        Self {
            id: provider.id.clone(),
            name: provider.display_name(kind),
            profession: provider.profession.clone(),
            location: provider.location.clone(),
            price,
        }
    }
}

/// Serializable snapshot of a booking session.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub kind: ProviderKind,
    pub stage: BookingStage,
    pub customer_id: String,
    pub draft: BookingDraft,
    pub providers: Vec<ProviderSummary>,
    pub services: Vec<NursingService>,
    pub dates: DatePage,
    pub slots: SlotBuckets,
    pub errors: FieldErrors,
    pub notice: Option<String>,
    pub failure: Option<String>,
    pub payment: Option<PaymentInstructions>,
    pub redirect_after_ms: Option<u64>,
}
