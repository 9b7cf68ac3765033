//! Scripting client configuration.
//!
//! ```rust
//! use std::time::Duration;
//! use ydbx_scripting::{RetryConfig, ScriptingConfig, ScriptingOption};
//!
//! let config = ScriptingConfig::new([
//!     ScriptingOption::OperationTimeout(Duration::from_secs(5)),
//!     ScriptingOption::Retry(RetryConfig::new().max_retries(10)),
//! ]);
//! assert_eq!(config.operation_timeout(), Some(Duration::from_secs(5)));
//! assert_eq!(config.retry().max_retries, 10);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::retry::RetryConfig;

/// A single configuration delta.
#[derive(Debug, Clone)]
pub enum ScriptingOption {
    /// Server-side operation timeout.
    OperationTimeout(Duration),
    /// Server-side cancel-after for operations.
    OperationCancelAfter(Duration),
    /// Retry policy for every operation.
    Retry(RetryConfig),
}

/// Configuration handed to the client builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptingConfig {
    /// Server-side operation timeout, in milliseconds in config files.
    #[serde(default, with = "millis_opt", skip_serializing_if = "Option::is_none")]
    operation_timeout: Option<Duration>,

    /// Server-side cancel-after, in milliseconds in config files.
    #[serde(default, with = "millis_opt", skip_serializing_if = "Option::is_none")]
    operation_cancel_after: Option<Duration>,

    /// Retry policy.
    #[serde(default)]
    retry: RetryConfig,
}

impl ScriptingConfig {
    /// Build a configuration by applying `options` in order.
    pub fn new(options: impl IntoIterator<Item = ScriptingOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            match option {
                ScriptingOption::OperationTimeout(timeout) => {
                    config.operation_timeout = Some(timeout);
                }
                ScriptingOption::OperationCancelAfter(after) => {
                    config.operation_cancel_after = Some(after);
                }
                ScriptingOption::Retry(retry) => config.retry = retry,
            }
        }
        config
    }

    /// Parse a TOML document.
    pub fn from_toml_str(input: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(input)?;
        debug!(
            operation_timeout = ?config.operation_timeout,
            max_retries = config.retry.max_retries,
            "ScriptingConfig loaded"
        );
        Ok(config)
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Server-side operation timeout.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    /// Server-side cancel-after.
    pub fn operation_cancel_after(&self) -> Option<Duration> {
        self.operation_cancel_after
    }

    /// Retry policy.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }
}

/// `Duration` as integer milliseconds.
pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// `Option<Duration>` as integer milliseconds.
pub(crate) mod millis_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => super::millis::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
