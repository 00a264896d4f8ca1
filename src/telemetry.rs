//! Tracing subscriber installation.

use crate::config::{ConfigError, LOG_FILTER_VAR};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Parses a `tracing` filter directive such as `staffline=debug,info`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] naming `STAFFLINE_LOG` when any
/// directive cannot be parsed.
pub fn parse_log_filter(directives: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directives).map_err(|err| ConfigError::Invalid {
        variable: LOG_FILTER_VAR,
        value: directives.to_owned(),
        reason: err.to_string(),
    })
}

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` (usually
/// [`StafflineConfig::log_filter`](crate::config::StafflineConfig)) is used.
/// Returns `Ok(false)` when a global subscriber was already installed, which
/// happens when several tests initialise tracing in one process.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `default_filter` is needed and
/// does not parse.
pub fn init_tracing(default_filter: &str) -> Result<bool, ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_log_filter(default_filter)?,
    };
    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok())
}
