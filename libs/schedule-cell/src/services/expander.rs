use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use tracing::{debug, instrument, warn};

use crate::models::{Shift, ShiftId, SlotBucket, SlotBuckets, TimeSlot, WeeklySchedule};
use crate::services::availability::{AvailabilitySource, ScheduleAvailability};

pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const DEFAULT_STEP_MINUTES: u32 = 15;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Bookable dates in `[reference, reference + horizon_days)` whose weekday
/// is enabled, in chronological order.
pub fn expand_available_dates(
    schedule: Option<&WeeklySchedule>,
    reference: NaiveDate,
    horizon_days: u32,
) -> Vec<NaiveDate> {
    let Some(schedule) = schedule else {
        return Vec::new();
    };

    reference
        .iter_days()
        .take(horizon_days as usize)
        .filter(|date| schedule.day(date.weekday()).enabled)
        .collect()
}

/// Slots for `date`, every derived slot marked available.
pub fn expand_time_slots(
    schedule: Option<&WeeklySchedule>,
    date: NaiveDate,
    step_minutes: u32,
) -> SlotBuckets {
    expand_time_slots_with(schedule, date, step_minutes, &ScheduleAvailability)
}

#[instrument(skip(schedule, source))]
pub fn expand_time_slots_with(
    schedule: Option<&WeeklySchedule>,
    date: NaiveDate,
    step_minutes: u32,
    source: &dyn AvailabilitySource,
) -> SlotBuckets {
    let mut buckets = SlotBuckets::default();

    let Some(schedule) = schedule else {
        return buckets;
    };
    if step_minutes == 0 {
        warn!("Refusing to expand slots with a zero-minute step");
        return buckets;
    }

    let day = schedule.day(date.weekday());
    if !day.enabled {
        return buckets;
    }

    for shift in day.shifts.iter().filter(|s| s.enabled) {
        if shift.id == ShiftId::Unknown {
            debug!("Skipping shift with unrecognised id on {}", date);
            continue;
        }

        for (time, next_day) in shift_times(shift, step_minutes) {
            let Some(bucket) = SlotBucket::for_shift(shift.id, time) else {
                continue;
            };
            let slot_date = if next_day {
                date.succ_opt().unwrap_or(date)
            } else {
                date
            };
            let available = source.is_available(slot_date, time);
            buckets.bucket_mut(bucket).push(TimeSlot::new(time, available, next_day));
        }
    }

    buckets.normalize();
    debug!("Expanded {} slots for {}", buckets.len(), date);
    buckets
}

/// Start times over `[start, end)` at `step` minutes. A shift whose end is
/// before its start runs past midnight; those slots come back flagged
/// `next_day`. Equal start and end yields nothing.
fn shift_times(shift: &Shift, step_minutes: u32) -> Vec<(NaiveTime, bool)> {
    let start = minute_of_day(shift.start_time);
    let mut end = minute_of_day(shift.end_time);

    if end == start {
        warn!("Shift {:?} has zero length, no slots produced", shift.id);
        return Vec::new();
    }
    if shift.wraps_midnight() {
        end += MINUTES_PER_DAY;
    }

    (start..end)
        .step_by(step_minutes as usize)
        .filter_map(|minute| {
            let next_day = minute >= MINUTES_PER_DAY;
            let minute = minute % MINUTES_PER_DAY;
            NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).map(|t| (t, next_day))
        })
        .collect()
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
