//! Connection configuration.
//!
//! A [`Config`] is never mutated once built. It is produced by applying an
//! ordered list of [`ConfigOption`] deltas to the default value; a later
//! delta for the same field overrides an earlier one.

use serde::{Deserialize, Serialize};

/// A single configuration delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOption {
    /// Use TLS.
    Secure(bool),
    /// `host:port` of the discovery endpoint.
    Endpoint(String),
    /// Absolute database path.
    Database(String),
}

impl ConfigOption {
    fn apply(self, config: &mut Config) {
        match self {
            Self::Secure(secure) => config.secure = secure,
            Self::Endpoint(endpoint) => config.endpoint = endpoint,
            Self::Database(database) => config.database = database,
        }
    }
}

/// Connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    database: String,
}

impl Config {
    /// Build a configuration by applying `options` in order.
    pub fn new(options: impl IntoIterator<Item = ConfigOption>) -> Self {
        options.into_iter().fold(Self::default(), |mut config, option| {
            option.apply(&mut config);
            config
        })
    }

    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether TLS is used.
    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// The endpoint (`host:port`).
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The database path.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Rebuild with extra options applied on top of this configuration.
    #[must_use]
    pub fn with(&self, options: impl IntoIterator<Item = ConfigOption>) -> Self {
        options.into_iter().fold(self.clone(), |mut config, option| {
            option.apply(&mut config);
            config
        })
    }
}

/// Builder for [`Config`].
///
/// Records the same deltas [`Config::new`] takes, so a builder and an option
/// list with the same calls in the same order produce equal configurations.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    options: Vec<ConfigOption>,
}

impl ConfigBuilder {
    /// Enable or disable TLS.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.options.push(ConfigOption::Secure(secure));
        self
    }

    /// Set the endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options.push(ConfigOption::Endpoint(endpoint.into()));
        self
    }

    /// Set the database path.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.options.push(ConfigOption::Database(database.into()));
        self
    }

    /// Append an arbitrary option.
    #[must_use]
    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    /// The deltas recorded so far.
    #[must_use]
    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config::new(self.options)
    }
}
