use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use schedule_cell::models::{DoctorFilter, Provider, ProviderKind, SlotBuckets, WeeklySchedule};
use schedule_cell::services::expander::{DEFAULT_HORIZON_DAYS, DEFAULT_STEP_MINUTES};
use schedule_cell::services::{
    expand_available_dates, expand_time_slots_with, filter_by_location, AvailabilitySource, DatePage,
    DateWindow,
};
use shared_config::{AppConfig, DEFAULT_SUCCESS_REDIRECT_MS};
use shared_models::auth::CustomerIdentity;

use crate::error::BookingError;
use crate::models::{
    BookingDraft, BookingPayload, BookingStage, BookingView, ConsultationType, FetchOutcome, FetchTicket,
    Field, FieldErrors, FilterUpdate, NursingService, PatientUpdate, ProviderQuery, ProviderSummary,
    SubmissionOutcome,
};
use crate::services::payment::PaymentInstructions;
use crate::services::pricing::quote_price;
use crate::services::validation::{parse_age, required_fields, PatientValidator};

pub const GENERIC_FAILURE: &str = "Booking failed";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSettings {
    pub horizon_days: u32,
    pub step_minutes: u32,
    pub redirect_delay: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            step_minutes: DEFAULT_STEP_MINUTES,
            redirect_delay: Duration::from_millis(DEFAULT_SUCCESS_REDIRECT_MS),
        }
    }
}

impl FlowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            horizon_days: config.booking_horizon_days,
            step_minutes: config.slot_step_minutes,
            redirect_delay: config.success_redirect_delay(),
        }
    }
}

const SCHEDULE_STAGES: [BookingStage; 3] = [
    BookingStage::SelectingDate,
    BookingStage::SelectingTime,
    BookingStage::FillingPatientDetails,
];

/// One customer's way through a booking, from provider choice to the
/// submitted appointment.
///
/// The controller never performs I/O. Fetches are started by asking for a
/// [`FetchTicket`] and finished by handing the result back with that
/// ticket; results carrying an outdated ticket are dropped.
pub struct BookingFlow {
    kind: ProviderKind,
    customer: CustomerIdentity,
    settings: FlowSettings,
    availability: Arc<dyn AvailabilitySource>,
    validator: PatientValidator,

    stage: BookingStage,
    draft: BookingDraft,
    touched: BTreeSet<Field>,
    errors: FieldErrors,

    providers: Vec<Provider>,
    services: Vec<NursingService>,
    selected: Option<Provider>,
    schedule: Option<WeeklySchedule>,
    dates: Vec<NaiveDate>,
    window: DateWindow,
    slots: SlotBuckets,

    list_generation: u64,
    record_generation: u64,

    notice: Option<String>,
    failure: Option<String>,
    redirect_after: Option<Duration>,
}

impl std::fmt::Debug for BookingFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFlow")
            .field("kind", &self.kind)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl BookingFlow {
    pub fn new(
        kind: ProviderKind,
        customer: CustomerIdentity,
        settings: FlowSettings,
        availability: Arc<dyn AvailabilitySource>,
    ) -> Self {
        Self {
            kind,
            customer,
            settings,
            availability,
            validator: PatientValidator::new(),
            stage: BookingStage::SelectingProvider,
            draft: fresh_draft(kind),
            touched: BTreeSet::new(),
            errors: FieldErrors::new(),
            providers: Vec::new(),
            services: Vec::new(),
            selected: None,
            schedule: None,
            dates: Vec::new(),
            window: DateWindow::default(),
            slots: SlotBuckets::default(),
            list_generation: 0,
            record_generation: 0,
            notice: None,
            failure: None,
            redirect_after: None,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn stage(&self) -> BookingStage {
        self.stage
    }

    pub fn customer(&self) -> &CustomerIdentity {
        &self.customer
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn available_dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn slots(&self) -> &SlotBuckets {
        &self.slots
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn redirect_after(&self) -> Option<Duration> {
        self.redirect_after
    }

    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    pub fn set_services(&mut self, services: Vec<NursingService>) {
        self.services = services;
    }

    // ==========================================================================
    // PROVIDER SELECTION
    // ==========================================================================

    /// Apply filter changes. Returns `true` when the provider list has to be
    /// fetched again; the current provider choice is dropped in that case.
    pub fn update_filters(&mut self, update: FilterUpdate) -> Result<bool, BookingError> {
        self.require_editable("change filters")?;

        let service = match update.service_id.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(id) => Some(Some(
                self.services
                    .iter()
                    .find(|s| s.id == id)
                    .cloned()
                    .ok_or_else(|| BookingError::UnknownService(id.to_string()))?,
            )),
        };

        let mut refetch = false;

        if let Some(consultation_type) = update.consultation_type {
            if self.kind == ProviderKind::Nurse {
                debug!("Ignoring consultation type {} on a nursing booking", consultation_type);
            } else {
                refetch |= self.draft.consultation_type != Some(consultation_type);
                self.draft.consultation_type = Some(consultation_type);
                self.touch(Field::ConsultationType);
            }
        }

        if let Some(hospital_id) = update.hospital_id {
            let hospital_id = non_blank(hospital_id);
            refetch |= self.draft.hospital_id != hospital_id;
            self.draft.hospital_id = hospital_id;
            self.touch(Field::Hospital);
        }

        if let Some(specialty) = update.specialty {
            let specialty = non_blank(specialty);
            refetch |= self.draft.specialty != specialty;
            self.draft.specialty = specialty;
        }

        if let Some(service) = service {
            self.draft.service = service;
            self.touch(Field::Service);
        }

        if let Some(location) = update.location {
            self.draft.location = non_blank(location);
        }

        // Only the doctor list depends on server-side filters.
        let refetch = refetch && self.kind == ProviderKind::Doctor;
        if refetch && self.draft.provider_id.is_some() {
            debug!("Filters changed, dropping provider {:?}", self.draft.provider_id);
            self.drop_provider();
        }

        self.refresh_price();
        Ok(refetch)
    }

    /// Start a provider-list fetch. `None` means there is nothing to fetch
    /// yet (a doctor booking without a consultation type); any list fetch
    /// still in flight is invalidated either way.
    pub fn request_provider_list(&mut self) -> Option<(FetchTicket, ProviderQuery)> {
        self.list_generation += 1;
        let ticket = FetchTicket(self.list_generation);

        match self.kind {
            ProviderKind::Nurse => Some((ticket, ProviderQuery::ActiveNurses)),
            ProviderKind::Doctor => match self.draft.consultation_type {
                Some(consultation_type) => Some((
                    ticket,
                    ProviderQuery::Doctors(DoctorFilter {
                        appointment_type: Some(consultation_type.as_str().to_string()),
                        hospital_id: self.draft.hospital_id.clone(),
                        specialty: self.draft.specialty.clone(),
                    }),
                )),
                None => {
                    self.providers.clear();
                    None
                }
            },
        }
    }

    pub fn apply_provider_list(&mut self, ticket: FetchTicket, result: Result<Vec<Provider>, String>) -> FetchOutcome {
        if ticket.0 != self.list_generation {
            debug!("Discarding stale provider list (ticket {}, current {})", ticket.0, self.list_generation);
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(providers) => {
                info!("Provider list updated with {} {}s", providers.len(), self.kind);
                self.providers = providers;
                self.notice = None;
            }
            Err(message) => {
                warn!("Provider list failed to load: {}", message);
                self.providers.clear();
                self.notice = Some(message);
            }
        }
        FetchOutcome::Applied
    }

    /// Choose a provider from the current list and start fetching its
    /// record. Any previous date and time choice is cleared.
    pub fn select_provider(&mut self, provider_id: &str) -> Result<FetchTicket, BookingError> {
        self.require_editable("choose a provider")?;

        let provider = self
            .providers
            .iter()
            .find(|p| p.id == provider_id)
            .cloned()
            .ok_or_else(|| BookingError::UnknownProvider(provider_id.to_string()))?;

        self.drop_provider();
        self.draft.provider_id = Some(provider.id.clone());
        self.draft.provider_name = Some(provider.display_name(self.kind));
        self.selected = Some(provider);
        self.refresh_price();
        self.touch(Field::Provider);
        self.revalidate(&[Field::Date, Field::Time]);

        self.stage = BookingStage::SelectingSchedule;
        Ok(FetchTicket(self.record_generation))
    }

    /// Hand back the provider record fetched for `ticket`. `today` is the
    /// first day of the booking horizon.
    pub fn apply_provider_record(
        &mut self,
        ticket: FetchTicket,
        result: Result<Provider, String>,
        today: NaiveDate,
    ) -> FetchOutcome {
        if ticket.0 != self.record_generation || self.stage != BookingStage::SelectingSchedule {
            debug!(
                "Discarding stale provider record (ticket {}, current {}, stage {})",
                ticket.0, self.record_generation, self.stage
            );
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(provider) => {
                self.schedule = provider.schedule();
                self.dates = expand_available_dates(self.schedule.as_ref(), today, self.settings.horizon_days);
                self.window.reset();
                self.draft.provider_name = Some(provider.display_name(self.kind));
                self.selected = Some(provider);
                self.refresh_price();

                if self.dates.is_empty() {
                    info!("{} {:?} has no bookable dates", self.kind, self.draft.provider_id);
                    self.stage = BookingStage::NoAvailability;
                } else {
                    debug!("{} bookable dates from {}", self.dates.len(), today);
                    self.stage = BookingStage::SelectingDate;
                }
            }
            Err(message) => {
                warn!("Provider record failed to load: {}", message);
                self.notice = Some(message);
                self.stage = BookingStage::NoAvailability;
            }
        }
        FetchOutcome::Applied
    }

    // ==========================================================================
    // DATE & TIME
    // ==========================================================================

    pub fn date_page(&self) -> DatePage {
        self.window.page(&self.dates)
    }

    pub fn next_dates(&mut self) -> DatePage {
        self.window.next(self.dates.len());
        self.date_page()
    }

    pub fn previous_dates(&mut self) -> DatePage {
        self.window.previous();
        self.date_page()
    }

    /// Choose a date. The chosen time is cleared before anything else, so a
    /// time from the previous date can never survive a date change.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.require(&SCHEDULE_STAGES, "select a date")?;

        self.draft.clear_time();
        self.slots = SlotBuckets::default();
        self.draft.date = None;
        self.stage = BookingStage::SelectingDate;
        self.touch(Field::Date);

        if !self.dates.contains(&date) {
            self.revalidate(&[Field::Date, Field::Time]);
            return Err(BookingError::DateUnavailable(date));
        }

        self.draft.date = Some(date);
        self.slots = expand_time_slots_with(
            self.schedule.as_ref(),
            date,
            self.settings.step_minutes,
            self.availability.as_ref(),
        );
        self.revalidate(&[Field::Date, Field::Time]);
        self.stage = BookingStage::SelectingTime;
        Ok(())
    }

    /// Same-day slot at `time`. Post-midnight slots of a wrapping shift are
    /// reached through [`BookingFlow::select_slot`].
    pub fn select_time(&mut self, time: NaiveTime) -> Result<(), BookingError> {
        self.select_slot(time, false)
    }

    /// A slot is identified by its time and whether it falls after midnight.
    pub fn select_slot(&mut self, time: NaiveTime, next_day: bool) -> Result<(), BookingError> {
        self.require(&SCHEDULE_STAGES[1..], "select a time")?;

        let bucket = self
            .slots
            .find(time, next_day)
            .filter(|(_, slot)| slot.available)
            .map(|(bucket, _)| bucket)
            .ok_or(BookingError::SlotUnavailable(time))?;

        self.draft.time = Some(time);
        self.draft.bucket = Some(bucket);
        self.draft.next_day = next_day;
        self.touch(Field::Time);
        self.stage = BookingStage::FillingPatientDetails;
        Ok(())
    }

    // ==========================================================================
    // PATIENT DETAILS
    // ==========================================================================

    /// Apply a partial edit. Only the fields present in the update are
    /// marked touched and re-validated.
    pub fn update_patient(&mut self, update: PatientUpdate) -> Result<(), BookingError> {
        self.require_editable("edit patient details")?;

        if let Some(name) = update.name {
            self.draft.patient.name = name;
            self.touch(Field::PatientName);
        }
        if let Some(phone) = update.phone {
            self.draft.patient.phone = phone;
            self.touch(Field::PatientPhone);
        }
        if let Some(age) = update.age {
            self.draft.patient.age = age;
            self.touch(Field::PatientAge);
        }
        if let Some(gender) = update.gender {
            self.draft.patient.gender = Some(gender);
            self.touch(Field::PatientGender);
        }
        if let Some(address) = update.address {
            self.draft.address = address;
            self.touch(Field::Address);
        }
        if let Some(notes) = update.notes {
            self.draft.notes = notes;
        }
        Ok(())
    }

    // ==========================================================================
    // PAYMENT & SUBMISSION
    // ==========================================================================

    /// Validate the whole draft and, if it is complete, wait for payment.
    pub fn proceed_to_payment(&mut self) -> Result<(), BookingError> {
        self.require(&[BookingStage::FillingPatientDetails], "proceed to payment")?;

        self.touched.extend(required_fields(self.kind).iter().copied());
        self.errors = self.validator.validate(self.kind, &self.draft);
        if !self.errors.is_empty() {
            return Err(BookingError::Validation(self.errors.clone()));
        }

        info!("Booking for customer {} awaiting payment", self.customer.id);
        self.stage = BookingStage::AwaitingPayment;
        Ok(())
    }

    pub fn payment_instructions(&self) -> Option<PaymentInstructions> {
        matches!(
            self.stage,
            BookingStage::AwaitingPayment | BookingStage::Submitting | BookingStage::Failed
        )
        .then(|| PaymentInstructions::for_price(self.draft.price))
    }

    /// The customer says they have paid; returns the body to submit.
    pub fn acknowledge_payment(&mut self) -> Result<BookingPayload, BookingError> {
        self.require(&[BookingStage::AwaitingPayment], "confirm payment")?;

        let payload = self.build_payload()?;
        self.failure = None;
        self.stage = BookingStage::Submitting;
        Ok(payload)
    }

    pub fn complete_submission(&mut self, outcome: SubmissionOutcome) -> Result<(), BookingError> {
        self.require(&[BookingStage::Submitting], "record a submission result")?;

        match outcome {
            SubmissionOutcome::Accepted(_) => {
                info!("Booking for customer {} accepted", self.customer.id);
                self.clear_draft();
                self.redirect_after = Some(self.settings.redirect_delay);
                self.stage = BookingStage::Succeeded;
            }
            SubmissionOutcome::Rejected(message) => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                warn!("Booking for customer {} rejected: {}", self.customer.id, message);
                self.failure = Some(message);
                self.stage = BookingStage::Failed;
            }
        }
        Ok(())
    }

    /// Back to payment with the draft exactly as it was submitted.
    pub fn retry(&mut self) -> Result<(), BookingError> {
        self.require(&[BookingStage::Failed], "retry")?;
        self.failure = None;
        self.stage = BookingStage::AwaitingPayment;
        Ok(())
    }

    pub fn back_to_details(&mut self) -> Result<(), BookingError> {
        self.require(&[BookingStage::AwaitingPayment, BookingStage::Failed], "edit details")?;
        self.failure = None;
        self.stage = BookingStage::FillingPatientDetails;
        Ok(())
    }

    /// Abandon the booking. In-flight fetches are invalidated.
    pub fn cancel(&mut self) -> Result<(), BookingError> {
        if self.stage == BookingStage::Submitting {
            return Err(BookingError::InvalidTransition {
                stage: self.stage,
                action: "cancel",
            });
        }

        self.clear_draft();
        self.providers.clear();
        self.list_generation += 1;
        self.notice = None;
        self.failure = None;
        self.redirect_after = None;
        self.stage = BookingStage::SelectingProvider;
        Ok(())
    }

    pub fn view(&self) -> BookingView {
        let location = self.draft.location.as_deref().unwrap_or("");
        let providers = match self.kind {
            ProviderKind::Nurse => filter_by_location(&self.providers, location),
            ProviderKind::Doctor => self.providers.iter().collect(),
        };

        BookingView {
            kind: self.kind,
            stage: self.stage,
            customer_id: self.customer.id.clone(),
            draft: self.draft.clone(),
            providers: providers
                .into_iter()
                .map(|p| {
                    let price = quote_price(self.draft.consultation_type, Some(p), self.draft.service.as_ref());
                    ProviderSummary::from_provider(p, self.kind, price)
                })
                .collect(),
            services: self.services.clone(),
            dates: self.date_page(),
            slots: self.slots.clone(),
            errors: self.errors.clone(),
            notice: self.notice.clone(),
            failure: self.failure.clone(),
            payment: self.payment_instructions(),
            redirect_after_ms: self.redirect_after.map(|d| d.as_millis() as u64),
        }
    }

    // ==========================================================================
    // INTERNALS
    // ==========================================================================

    fn build_payload(&self) -> Result<BookingPayload, BookingError> {
        let errors = self.validator.validate(self.kind, &self.draft);
        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        let draft = &self.draft;
        let (Some(date), Some(time), Some(bucket), Some(gender), Some(age), Some(consultation_type)) = (
            draft.date,
            draft.time,
            draft.bucket,
            draft.patient.gender,
            parse_age(&draft.patient.age),
            draft.consultation_type,
        ) else {
            return Err(BookingError::Validation(errors));
        };

        let appointment_date = if draft.next_day {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };

        let (doctor_id, nurse_id) = match self.kind {
            ProviderKind::Doctor => (draft.provider_id.clone(), None),
            ProviderKind::Nurse => (None, draft.provider_id.clone()),
        };
        let nursing = self.kind == ProviderKind::Nurse;

        Ok(BookingPayload {
            patient_name: draft.patient.name.trim().to_string(),
            patient_phone: draft.patient.phone.trim().to_string(),
            patient_age: age,
            patient_gender: gender,
            appointment_type: consultation_type,
            appointment_date,
            shift: bucket.label().to_string(),
            appointment_time: time.format("%H:%M").to_string(),
            status: "Scheduled".to_string(),
            customer_id: self.customer.id.clone(),
            doctor_id,
            hospital_id: if nursing { None } else { draft.hospital_id.clone() },
            specialty: if nursing { None } else { draft.specialty.clone() },
            nurse_id,
            service_id: draft.service.as_ref().map(|s| s.id.clone()),
            address: nursing.then(|| draft.address.trim().to_string()),
            location: if nursing { draft.location.clone() } else { None },
            notes: non_blank(draft.notes.clone()),
            price: draft.price,
        })
    }

    fn require(&self, allowed: &[BookingStage], action: &'static str) -> Result<(), BookingError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            warn!("Rejected '{}' while {}", action, self.stage);
            Err(BookingError::InvalidTransition {
                stage: self.stage,
                action,
            })
        }
    }

    fn require_editable(&self, action: &'static str) -> Result<(), BookingError> {
        if self.stage.is_editable() {
            Ok(())
        } else {
            Err(BookingError::InvalidTransition {
                stage: self.stage,
                action,
            })
        }
    }

    /// Mark `field` touched and re-validate it alone.
    fn touch(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(&[field]);
    }

    fn revalidate(&mut self, fields: &[Field]) {
        for field in fields {
            if !self.touched.contains(field) {
                continue;
            }
            match self.validator.validate_field(self.kind, &self.draft, *field) {
                Some(message) => {
                    self.errors.insert(*field, message);
                }
                None => {
                    self.errors.remove(field);
                }
            }
        }
    }

    /// Forget the chosen provider and everything derived from its schedule.
    /// Bumping the record generation drops any record fetch still running.
    fn drop_provider(&mut self) {
        self.draft.clear_provider();
        self.selected = None;
        self.schedule = None;
        self.dates.clear();
        self.window.reset();
        self.slots = SlotBuckets::default();
        self.record_generation += 1;
        self.refresh_price();
        self.revalidate(&[Field::Provider, Field::Date, Field::Time]);
        self.stage = BookingStage::SelectingProvider;
    }

    fn clear_draft(&mut self) {
        self.drop_provider();
        self.draft = fresh_draft(self.kind);
        self.touched.clear();
        self.errors.clear();
    }

    fn refresh_price(&mut self) {
        self.draft.price = quote_price(
            self.draft.consultation_type,
            self.selected.as_ref(),
            self.draft.service.as_ref(),
        );
    }
}

fn fresh_draft(kind: ProviderKind) -> BookingDraft {
    BookingDraft {
        consultation_type: (kind == ProviderKind::Nurse).then_some(ConsultationType::Nursing),
        ..BookingDraft::default()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
