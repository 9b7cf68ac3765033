//! Connector options.
//!
//! Connector options configure how the SQL driver layer behaves, as opposed
//! to [`ConfigOption`](crate::ConfigOption)s which configure the connection
//! itself. They are applied left to right to a [`Connector`] descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bind::Bind;

/// Which service a query goes to when the caller does not say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Data queries through the table service.
    #[default]
    Data,
    /// Explain only.
    Explain,
    /// Scan queries.
    Scan,
    /// Scheme (DDL) queries.
    Scheme,
    /// Scripting service.
    Scripting,
}

impl QueryMode {
    /// Parse from a `query_mode` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "data" => Some(Self::Data),
            "explain" => Some(Self::Explain),
            "scan" => Some(Self::Scan),
            "scheme" => Some(Self::Scheme),
            "scripting" => Some(Self::Scripting),
            _ => None,
        }
    }

    /// The `query_mode` value for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Explain => "explain",
            Self::Scan => "scan",
            Self::Scheme => "scheme",
            Self::Scripting => "scripting",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single connector delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorOption {
    /// Set the default query mode.
    DefaultQueryMode(QueryMode),
    /// Set the parameter bind mode.
    Bind(Bind),
}

impl ConnectorOption {
    fn apply(self, connector: &mut Connector) {
        match self {
            Self::DefaultQueryMode(mode) => connector.default_query_mode = mode,
            Self::Bind(bind) => connector.bind = Some(bind),
        }
    }
}

/// Driver behavior descriptor the connector options apply to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    default_query_mode: QueryMode,
    bind: Option<Bind>,
}

impl Connector {
    /// Build a connector by applying `options` in order.
    pub fn new(options: impl IntoIterator<Item = ConnectorOption>) -> Self {
        let mut connector = Self::default();
        for option in options {
            option.apply(&mut connector);
        }
        connector
    }

    /// The default query mode.
    pub fn default_query_mode(&self) -> QueryMode {
        self.default_query_mode
    }

    /// The bind mode, if one was configured.
    pub fn bind(&self) -> Option<&Bind> {
        self.bind.as_ref()
    }
}
