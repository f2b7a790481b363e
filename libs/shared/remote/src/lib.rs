pub mod caafi;
pub mod error;

pub use caafi::{CaafiClient, Envelope};
pub use error::RemoteError;
