//! Core runtime for marketdesk: session access, permission gating, the cached
//! entity query/mutation layer, derived views, and observability.
#![warn(unreachable_pub)]

pub mod cache;
pub mod client_state;
pub mod entity;
pub mod error;
pub mod gate;
pub mod integrations;
pub mod model;
pub mod obs;
pub mod platform;
pub mod query;
pub mod retry;
pub mod session;
pub mod views;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{Error, ErrorCode, ErrorOrigin};

///
/// CONSTANTS
///

/// Default number of retries applied to session and read fetches.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default fixed delay between retries, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No clients, stores, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        entity::{CollectionName, EntityKind, Filter, Payload, QueryKey, Record, RecordId, Sort},
        gate::{Decision, GateRequirements},
        model::{Booking, DeploymentChecklist, ProviderProfile, Review, ServiceListing, Transaction},
        session::{Role, SessionUser, UserType},
    };
}
