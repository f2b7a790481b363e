use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Decides whether a derived slot can actually be booked.
pub trait AvailabilitySource: Send + Sync {
    fn is_available(&self, date: NaiveDate, time: NaiveTime) -> bool;
}

/// Every slot derived from the provider's schedule is bookable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleAvailability;

impl AvailabilitySource for ScheduleAvailability {
    fn is_available(&self, _date: NaiveDate, _time: NaiveTime) -> bool {
        true
    }
}

/// Explicit set of blocked slots, everything else available.
#[derive(Debug, Clone, Default)]
pub struct FixedAvailability {
    blocked: HashSet<NaiveDateTime>,
}

impl FixedAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.blocked.insert(date.and_time(time));
        self
    }
}

impl AvailabilitySource for FixedAvailability {
    fn is_available(&self, date: NaiveDate, time: NaiveTime) -> bool {
        !self.blocked.contains(&date.and_time(time))
    }
}

/// Demo availability: pseudo-random but fully determined by the seed and
/// the slot, so repeated expansions agree with each other.
#[derive(Debug, Clone, Copy)]
pub struct SeededAvailability {
    seed: u64,
    open_ratio: f64,
}

impl SeededAvailability {
    pub fn new(seed: u64, open_ratio: f64) -> Self {
        Self {
            seed,
            open_ratio: open_ratio.clamp(0.0, 1.0),
        }
    }
}

impl AvailabilitySource for SeededAvailability {
    fn is_available(&self, date: NaiveDate, time: NaiveTime) -> bool {
        let minute_of_day = (time.hour() * 60 + time.minute()) as u64;
        let slot_key = (date.num_days_from_ce() as u64) * 1440 + minute_of_day;
        let mut rng = StdRng::seed_from_u64(self.seed ^ slot_key.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        rng.gen_bool(self.open_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_fixed_availability_blocks_only_listed_slots() {
        let source = FixedAvailability::new().block(date(), at(9, 15));

        assert!(source.is_available(date(), at(9, 0)));
        assert!(!source.is_available(date(), at(9, 15)));
        assert!(source.is_available(date().succ_opt().unwrap(), at(9, 15)));
    }

    #[test]
    fn test_seeded_availability_is_repeatable() {
        let a = SeededAvailability::new(7, 0.5);
        let b = SeededAvailability::new(7, 0.5);

        for minute in (0..60).step_by(15) {
            assert_eq!(a.is_available(date(), at(10, minute)), b.is_available(date(), at(10, minute)));
        }
    }

    #[test]
    fn test_seeded_availability_extremes() {
        let closed = SeededAvailability::new(1, 0.0);
        let open = SeededAvailability::new(1, 1.0);

        assert!(!closed.is_available(date(), at(8, 0)));
        assert!(open.is_available(date(), at(8, 0)));
    }
}
