pub mod booking;
pub mod directory;
pub mod flow;
pub mod history;
pub mod payment;
pub mod pricing;
pub mod sessions;
pub mod submission;
pub mod validation;

pub use booking::BookingService;
pub use directory::{DirectoryService, Listing};
pub use flow::{BookingFlow, FlowSettings};
pub use history::{HistoryFilter, HistoryService};
pub use sessions::SessionStore;
pub use submission::{AppointmentGateway, RemoteAppointmentGateway};
pub use validation::PatientValidator;
