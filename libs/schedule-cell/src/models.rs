use std::fmt;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use shared_models::lenient;
use shared_remote::RemoteError;

use crate::services::{adapter, format};

// ==============================================================================
// PROVIDERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Doctor,
    Nurse,
}

impl ProviderKind {
    /// Remote path of a single provider record.
    pub fn record_path(&self, provider_id: &str) -> String {
        let id = urlencoding::encode(provider_id);
        match self {
            ProviderKind::Doctor => format!("/api/doctor/{}", id),
            ProviderKind::Nurse => format!("/api/nurse/{}", id),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Doctor => write!(f, "doctor"),
            ProviderKind::Nurse => write!(f, "nurse"),
        }
    }
}

/// Doctor or nurse record as the CaafiCare API returns it. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub hospital_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_price")]
    pub card_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_price")]
    pub appointment_price: Option<f64>,
    /// Either a structured object or a JSON-encoded string.
    #[serde(default, skip_serializing)]
    pub work_schedule: Option<Value>,
}

impl Provider {
    /// Canonical schedule, `None` when absent or unparsable.
    pub fn schedule(&self) -> Option<WeeklySchedule> {
        adapter::normalize_work_schedule(self.work_schedule.as_ref())
    }

    pub fn display_name(&self, kind: ProviderKind) -> String {
        match kind {
            ProviderKind::Doctor if !self.name.starts_with("Dr") => format!("Dr. {}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorFilter {
    pub appointment_type: Option<String>,
    pub hospital_id: Option<String>,
    pub specialty: Option<String>,
}

// ==============================================================================
// WEEKLY SCHEDULE
// ==============================================================================

/// Recurring weekly template. A missing weekday key deserializes as a
/// disabled day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub monday: DaySchedule,
    #[serde(default)]
    pub tuesday: DaySchedule,
    #[serde(default)]
    pub wednesday: DaySchedule,
    #[serde(default)]
    pub thursday: DaySchedule,
    #[serde(default)]
    pub friday: DaySchedule,
    #[serde(default)]
    pub saturday: DaySchedule,
    #[serde(default)]
    pub sunday: DaySchedule,
}

impl WeeklySchedule {
    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut DaySchedule {
        match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    pub fn has_enabled_day(&self) -> bool {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .iter()
        .any(|d| self.day(*d).enabled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "usable_shifts")]
    pub shifts: Vec<Shift>,
}

/// Shift entries are read one at a time; an entry whose times or id do not
/// parse is dropped instead of failing the whole schedule.
fn usable_shifts<'de, D>(deserializer: D) -> Result<Vec<Shift>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Shift>(entry) {
            Ok(shift) => Some(shift),
            Err(e) => {
                warn!("Skipping unusable shift: {}", e);
                None
            }
        })
        .collect())
}

impl DaySchedule {
    pub fn enabled_with(shifts: Vec<Shift>) -> Self {
        Self { enabled: true, shifts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    #[serde(default)]
    pub enabled: bool,
    #[serde(alias = "start", with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(alias = "end", with = "hhmm")]
    pub end_time: NaiveTime,
}

impl Shift {
    pub fn new(id: ShiftId, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id,
            enabled: true,
            start_time,
            end_time,
        }
    }

    /// True when the shift crosses midnight (e.g. night 19:00 to 07:00).
    pub fn wraps_midnight(&self) -> bool {
        self.end_time < self.start_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftId {
    Morning,
    Afternoon,
    Evening,
    Night,
    FullDay,
    #[serde(other)]
    Unknown,
}

// ==============================================================================
// SLOTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotBucket {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl SlotBucket {
    pub fn label(&self) -> &'static str {
        match self {
            SlotBucket::Morning => "Morning",
            SlotBucket::Afternoon => "Afternoon",
            SlotBucket::Evening => "Evening",
            SlotBucket::Night => "Night",
        }
    }

    /// Bucket for a slot of the given shift. `full_day` slots are split by
    /// clock time; unknown shift ids have no bucket.
    pub fn for_shift(shift: ShiftId, time: NaiveTime) -> Option<Self> {
        match shift {
            ShiftId::Morning => Some(SlotBucket::Morning),
            ShiftId::Afternoon => Some(SlotBucket::Afternoon),
            ShiftId::Evening => Some(SlotBucket::Evening),
            ShiftId::Night => Some(SlotBucket::Night),
            ShiftId::FullDay => Some(match time.hour() {
                0..=11 => SlotBucket::Morning,
                12..=16 => SlotBucket::Afternoon,
                _ => SlotBucket::Evening,
            }),
            ShiftId::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub display: String,
    pub available: bool,
    /// Slot of a midnight-spanning shift that falls on the following day.
    #[serde(default)]
    pub next_day: bool,
}

impl TimeSlot {
    pub fn new(time: NaiveTime, available: bool, next_day: bool) -> Self {
        Self {
            time,
            display: format::format_time_12h(time),
            available,
            next_day,
        }
    }

    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBuckets {
    pub morning: Vec<TimeSlot>,
    pub afternoon: Vec<TimeSlot>,
    pub evening: Vec<TimeSlot>,
    pub night: Vec<TimeSlot>,
}

impl SlotBuckets {
    pub fn bucket(&self, bucket: SlotBucket) -> &[TimeSlot] {
        match bucket {
            SlotBucket::Morning => &self.morning,
            SlotBucket::Afternoon => &self.afternoon,
            SlotBucket::Evening => &self.evening,
            SlotBucket::Night => &self.night,
        }
    }

    pub fn bucket_mut(&mut self, bucket: SlotBucket) -> &mut Vec<TimeSlot> {
        match bucket {
            SlotBucket::Morning => &mut self.morning,
            SlotBucket::Afternoon => &mut self.afternoon,
            SlotBucket::Evening => &mut self.evening,
            SlotBucket::Night => &mut self.night,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len() + self.evening.len() + self.night.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotBucket, &TimeSlot)> {
        [
            SlotBucket::Morning,
            SlotBucket::Afternoon,
            SlotBucket::Evening,
            SlotBucket::Night,
        ]
        .into_iter()
        .flat_map(move |b| self.bucket(b).iter().map(move |slot| (b, slot)))
    }

    /// Slot at `time` on the start day, or after midnight when `next_day`.
    /// A wrapping shift can repeat a clock time, so both parts are needed.
    pub fn find(&self, time: NaiveTime, next_day: bool) -> Option<(SlotBucket, &TimeSlot)> {
        self.iter()
            .find(|(_, slot)| slot.time == time && slot.next_day == next_day)
    }

    pub fn displays(&self, bucket: SlotBucket) -> Vec<String> {
        self.bucket(bucket).iter().map(|s| s.display.clone()).collect()
    }

    /// Sort each bucket chronologically (post-midnight slots last) and drop
    /// duplicates produced by overlapping shifts.
    pub(crate) fn normalize(&mut self) {
        for bucket in [
            SlotBucket::Morning,
            SlotBucket::Afternoon,
            SlotBucket::Evening,
            SlotBucket::Night,
        ] {
            let slots = self.bucket_mut(bucket);
            slots.sort_by_key(|s| (s.next_day, s.time));
            slots.dedup_by(|a, b| a.time == b.time && a.next_day == b.next_day);
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Provider has no work schedule")]
    MissingSchedule,

    #[error("Malformed work schedule: {0}")]
    MalformedSchedule(String),

    #[error("Work schedule is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Remote API error: {0}")]
    Remote(#[from] RemoteError),
}

/// `"HH:MM"` wall-clock times; `"HH:MM:SS"` is accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time of day '{}'", raw)))
    }
}
