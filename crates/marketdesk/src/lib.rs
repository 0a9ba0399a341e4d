//! ## Crate layout
//! - `config`: typed TOML configuration and validation.
//! - `core`: session access, permission gate, cached entity queries,
//!   derived views, integrations, and observability.
//!
//! `App` wires them together from one `Config` and one platform handle; it
//! is the only owner of session and cache state.

pub use marketdesk_config as config;
pub use marketdesk_core as core;

mod app;
mod logging;

pub use app::{App, FinancialOverview};
pub use marketdesk_core::{Error, ErrorCode, ErrorOrigin};
pub use logging::init_logging;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        App, Error, ErrorCode,
        config::Config,
        core::{
            gate::{DecisionKind, GateAction},
            platform::Platform,
            prelude::*,
            views::StatusScope,
        },
    };
    pub use tokio_util::sync::CancellationToken;
}
