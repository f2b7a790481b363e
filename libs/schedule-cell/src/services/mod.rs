pub mod adapter;
pub mod availability;
pub mod expander;
pub mod format;
pub mod provider;
pub mod window;

pub use adapter::{normalize_work_schedule, parse_work_schedule};
pub use availability::{AvailabilitySource, FixedAvailability, ScheduleAvailability, SeededAvailability};
pub use expander::{expand_available_dates, expand_time_slots, expand_time_slots_with};
pub use provider::{filter_by_location, ProviderService};
pub use window::{DatePage, DateWindow};
