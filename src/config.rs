//! Runtime configuration for Staffline.
//!
//! Settings are read from `STAFFLINE_*` environment variables. The lookup
//! is injectable so callers and tests can supply values without touching
//! the process environment.

use crate::mission::adapters::postgres::MissionPgPool;
use crate::telemetry::parse_log_filter;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "STAFFLINE_DATABASE_URL";

/// Environment variable holding the maximum pool size.
pub const POOL_MAX_SIZE_VAR: &str = "STAFFLINE_POOL_MAX_SIZE";

/// Environment variable holding the default log filter.
pub const LOG_FILTER_VAR: &str = "STAFFLINE_LOG";

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while loading configuration or building the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required configuration variable {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {variable}: {reason}")]
    Invalid {
        /// Offending variable.
        variable: &'static str,
        /// Raw value supplied.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The connection pool could not be created.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StafflineConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    /// Default `tracing` filter directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

const fn default_pool_max_size() -> u32 {
    DEFAULT_POOL_MAX_SIZE
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

impl StafflineConfig {
    /// Creates a configuration with default pool size and log filter.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            log_filter: default_log_filter(),
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing, the pool
    /// size is not a positive integer, or the log filter does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing, the pool
    /// size is not a positive integer, or the log filter does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = non_blank(lookup(DATABASE_URL_VAR))
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let pool_max_size = match non_blank(lookup(POOL_MAX_SIZE_VAR)) {
            Some(raw) => parse_pool_size(raw)?,
            None => DEFAULT_POOL_MAX_SIZE,
        };
        let log_filter = match non_blank(lookup(LOG_FILTER_VAR)) {
            Some(raw) => {
                parse_log_filter(&raw)?;
                raw
            }
            None => default_log_filter(),
        };

        Ok(Self {
            database_url,
            pool_max_size,
            log_filter,
        })
    }

    /// Builds the Diesel connection pool used by the `PostgreSQL` adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot establish its
    /// initial connections.
    pub fn build_pool(&self) -> Result<MissionPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.database_url);
        let pool = Pool::builder()
            .max_size(self.pool_max_size)
            .build(manager)?;
        Ok(pool)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_pool_size(raw: String) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid {
            variable: POOL_MAX_SIZE_VAR,
            value: raw,
            reason: "pool size must be at least 1".to_owned(),
        }),
        Ok(size) => Ok(size),
        Err(err) => Err(ConfigError::Invalid {
            variable: POOL_MAX_SIZE_VAR,
            reason: err.to_string(),
            value: raw,
        }),
    }
}
