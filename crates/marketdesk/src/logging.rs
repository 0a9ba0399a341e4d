use crate::{
    config::LoggingConfig,
    core::{Error, ErrorCode, ErrorOrigin},
};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// Returns `Ok(false)` when a subscriber is already installed; that one is
/// kept. An unparsable filter is a config error.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, Error> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|err| {
        Error::new(
            ErrorCode::ConfigError,
            ErrorOrigin::Config,
            "invalid logging filter",
        )
        .with_details(format!("'{}': {err}", config.filter))
    })?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(filter = %config.filter, "logging initialized");
    }

    Ok(installed)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        let config = LoggingConfig {
            filter: "warn".into(),
            ansi: false,
        };

        let first = init_logging(&config).expect("filter is valid");
        let second = init_logging(&config).expect("filter is valid");

        assert!(!second || !first);
    }

    #[test]
    fn bad_filter_is_a_config_error() {
        let config = LoggingConfig {
            filter: "marketdesk=notalevel".into(),
            ansi: false,
        };

        let err = init_logging(&config).expect_err("filter should be rejected");

        assert_eq!(err.code, ErrorCode::ConfigError);
        assert!(err.details.is_some());
    }
}
