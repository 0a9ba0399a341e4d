//! Typed configuration for marketdesk, loaded from TOML.
//!
//! Every section and field has a default, so an empty document is a valid
//! configuration. Unknown keys are rejected.

mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub app: AppConfig,
    pub session: SessionConfig,
    pub query: QueryConfig,
    pub views: ViewsConfig,
    pub client_state: ClientStateConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_route("app.home_route", &self.app.home_route)?;
        validate_route("app.login_route", &self.app.login_route)?;
        validate_route("app.setup_route", &self.app.setup_route)?;

        if self.views.top_categories == 0 {
            return Err(ConfigError::invalid(
                "views.top_categories",
                "must be at least 1",
            ));
        }
        if self.client_state.max_access_logs == 0 {
            return Err(ConfigError::invalid(
                "client_state.max_access_logs",
                "must be at least 1",
            ));
        }
        if self.query.stale_after_ms == Some(0) {
            return Err(ConfigError::invalid(
                "query.stale_after_ms",
                "must be positive; omit it to keep reads until a write",
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::invalid("logging.filter", "must not be empty"));
        }

        Ok(())
    }
}

fn validate_route(field: &'static str, route: &str) -> Result<(), ConfigError> {
    if route.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if !route.starts_with('/') {
        return Err(ConfigError::invalid(
            field,
            format!("'{route}' must start with '/'"),
        ));
    }

    Ok(())
}

///
/// AppConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub app_id: String,
    pub home_route: String,
    pub login_route: String,

    /// Route where a user without a user type picks one.
    pub setup_route: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: "marketdesk".into(),
            home_route: "/".into(),
            login_route: "/login".into(),
            setup_route: "/selecionar-tipo".into(),
        }
    }
}

///
/// RetryConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl RetryConfig {
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay_ms: 1_000,
        }
    }
}

///
/// SessionConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub retry: RetryConfig,
}

///
/// QueryConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Applies to reads only; writes are never retried.
    pub retry: RetryConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_after_ms: Option<u64>,
}

impl QueryConfig {
    #[must_use]
    pub fn stale_after(&self) -> Option<Duration> {
        self.stale_after_ms.map(Duration::from_millis)
    }
}

///
/// ViewsConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewsConfig {
    pub top_categories: usize,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self { top_categories: 5 }
    }
}

///
/// ClientStateConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientStateConfig {
    /// JSON file holding theme and access log; `None` keeps them in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub max_access_logs: usize,
}

impl Default for ClientStateConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_access_logs: 100,
        }
    }
}

///
/// LoggingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, e.g. `info,marketdesk_core=debug`.
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            ansi: true,
        }
    }
}

///
/// TESTS
///
