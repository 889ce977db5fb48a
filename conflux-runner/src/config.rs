//! Configuration for throttled runners.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Environment variable read by [`ThrottleConfig::from_env`].
pub const ENV_MAX_CONCURRENCY: &str = "CONFLUX_MAX_CONCURRENCY";

/// Configuration errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A concurrency limit must be at least one.
    #[error("invalid concurrency limit {0}: must be at least 1")]
    InvalidConcurrency(usize),

    /// An environment variable held something unparsable.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// The raw value.
        value: String,
    },
}

/// Settings for a [`ThrottledAsync`](crate::ThrottledAsync) runner.
///
/// Missing fields take their defaults when deserialized:
///
/// ```
/// use conflux_runner::ThrottleConfig;
///
/// let config: ThrottleConfig = serde_json::from_str(r#"{ "max_concurrency": 4 }"#).unwrap();
/// assert_eq!(config.max_concurrency, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Maximum number of children running at once. Must be at least one.
    pub max_concurrency: usize,
}

impl Default for ThrottleConfig {
    /// One slot per available CPU, or one if that cannot be determined.
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

impl ThrottleConfig {
    /// A config with an explicit limit.
    pub fn with_max_concurrency(max_concurrency: usize) -> Self {
        Self { max_concurrency }
    }

    /// Read [`ENV_MAX_CONCURRENCY`], falling back to the default when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let Some(raw) = lookup(ENV_MAX_CONCURRENCY) else {
            return Ok(Self::default());
        };
        let max_concurrency = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: ENV_MAX_CONCURRENCY.to_owned(),
            value: raw.clone(),
        })?;
        let config = Self { max_concurrency };
        config.validate()?;
        Ok(config)
    }

    /// The limit as a [`NonZeroUsize`], or an error if it is zero.
    pub fn validate(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.max_concurrency)
            .ok_or(ConfigError::InvalidConcurrency(self.max_concurrency))
    }
}
