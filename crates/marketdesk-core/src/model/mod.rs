//! Typed entities for the collections the dashboards read.

mod booking;
mod checklist;
mod profile;
mod review;
mod service;
mod transaction;

pub use booking::{Booking, BookingStatus};
pub use checklist::DeploymentChecklist;
pub use profile::ProviderProfile;
pub use review::Review;
pub use service::ServiceListing;
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
