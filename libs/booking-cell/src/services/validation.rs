use regex::Regex;
use tracing::debug;

use schedule_cell::models::ProviderKind;

use crate::models::{BookingDraft, Field, FieldErrors};

pub const REQUIRED: &str = "Required";
pub const INVALID_AGE: &str = "Age must be a positive whole number";
pub const INVALID_PHONE: &str = "Enter a valid phone number";

const PHONE_PATTERN: &str = r"^\+?[0-9][0-9\s\-]{5,17}$";

const DOCTOR_FIELDS: [Field; 9] = [
    Field::PatientName,
    Field::PatientPhone,
    Field::PatientAge,
    Field::PatientGender,
    Field::ConsultationType,
    Field::Hospital,
    Field::Provider,
    Field::Date,
    Field::Time,
];

const NURSE_FIELDS: [Field; 9] = [
    Field::PatientName,
    Field::PatientPhone,
    Field::PatientAge,
    Field::PatientGender,
    Field::Service,
    Field::Provider,
    Field::Date,
    Field::Time,
    Field::Address,
];

pub fn required_fields(kind: ProviderKind) -> &'static [Field] {
    match kind {
        ProviderKind::Doctor => &DOCTOR_FIELDS,
        ProviderKind::Nurse => &NURSE_FIELDS,
    }
}

/// Positive integer age, `None` for anything else.
pub fn parse_age(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|age| *age > 0)
}

pub struct PatientValidator {
    phone_pattern: Option<Regex>,
}

impl Default for PatientValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientValidator {
    pub fn new() -> Self {
        Self {
            phone_pattern: Regex::new(PHONE_PATTERN).ok(),
        }
    }

    /// Message for one field, `None` when it is valid or not required for
    /// this kind of booking.
    pub fn validate_field(&self, kind: ProviderKind, draft: &BookingDraft, field: Field) -> Option<String> {
        if !required_fields(kind).contains(&field) {
            return None;
        }

        let message = match field {
            Field::PatientName => blank(&draft.patient.name).then_some(REQUIRED),
            Field::PatientPhone => {
                if blank(&draft.patient.phone) {
                    Some(REQUIRED)
                } else if !self.phone_ok(&draft.patient.phone) {
                    Some(INVALID_PHONE)
                } else {
                    None
                }
            }
            Field::PatientAge => {
                if blank(&draft.patient.age) {
                    Some(REQUIRED)
                } else {
                    parse_age(&draft.patient.age).is_none().then_some(INVALID_AGE)
                }
            }
            Field::PatientGender => draft.patient.gender.is_none().then_some(REQUIRED),
            Field::ConsultationType => draft.consultation_type.is_none().then_some(REQUIRED),
            Field::Hospital => missing(&draft.hospital_id).then_some(REQUIRED),
            Field::Service => draft.service.is_none().then_some(REQUIRED),
            Field::Provider => missing(&draft.provider_id).then_some(REQUIRED),
            Field::Date => draft.date.is_none().then_some(REQUIRED),
            Field::Time => draft.time.is_none().then_some(REQUIRED),
            Field::Address => blank(&draft.address).then_some(REQUIRED),
        };

        message.map(str::to_string)
    }

    pub fn validate(&self, kind: ProviderKind, draft: &BookingDraft) -> FieldErrors {
        let errors: FieldErrors = required_fields(kind)
            .iter()
            .filter_map(|field| self.validate_field(kind, draft, *field).map(|m| (*field, m)))
            .collect();

        debug!("Draft validation found {} problem(s)", errors.len());
        errors
    }

    fn phone_ok(&self, phone: &str) -> bool {
        match &self.phone_pattern {
            Some(pattern) => pattern.is_match(phone.trim()),
            None => true,
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn missing(value: &Option<String>) -> bool {
    value.as_deref().map(blank).unwrap_or(true)
}
