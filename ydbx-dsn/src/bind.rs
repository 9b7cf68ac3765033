//! Parameter binding modes.
//!
//! A bind mode tells the SQL driver layer how to treat parameter
//! placeholders in a query, and optionally which table path prefix to put
//! in front of relative table names.
//!
//! ```rust
//! use ydbx_dsn::Bind;
//!
//! let bind = Bind::numeric().with_table_path_prefix("path/to/tables");
//! assert_eq!(bind.table_path_prefix(), Some("path/to/tables"));
//!
//! // The prefix composes with the variant, it does not replace it.
//! assert_eq!(bind.kind(), ydbx_dsn::BindKind::Numeric);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`Bind`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindKind {
    /// `$1`, `$2`, ... placeholders.
    Numeric,
    /// `?` placeholders.
    Positional,
    /// Parameters are declared up front.
    Declare,
    /// No placeholder rewriting, only the table path prefix.
    TablePathPrefix,
}

/// A parameter binding mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Bind {
    /// Numeric placeholders.
    Numeric {
        /// Optional table path prefix.
        table_path_prefix: Option<String>,
    },
    /// Positional placeholders.
    Positional {
        /// Optional table path prefix.
        table_path_prefix: Option<String>,
    },
    /// Declared parameters.
    Declare {
        /// Optional table path prefix.
        table_path_prefix: Option<String>,
    },
    /// Table path prefix only.
    TablePathPrefix {
        /// The table path prefix.
        table_path_prefix: String,
    },
}

impl Bind {
    /// Numeric binding without a prefix.
    #[must_use]
    pub const fn numeric() -> Self {
        Self::Numeric {
            table_path_prefix: None,
        }
    }

    /// Positional binding without a prefix.
    #[must_use]
    pub const fn positional() -> Self {
        Self::Positional {
            table_path_prefix: None,
        }
    }

    /// Declare binding without a prefix.
    #[must_use]
    pub const fn declare() -> Self {
        Self::Declare {
            table_path_prefix: None,
        }
    }

    /// Table-path-prefix-only binding.
    #[must_use]
    pub fn table_path_prefix_only(prefix: impl Into<String>) -> Self {
        Self::TablePathPrefix {
            table_path_prefix: prefix.into(),
        }
    }

    /// Resolve a `go_auto_bind` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "numeric" => Some(Self::numeric()),
            "positional" => Some(Self::positional()),
            "declare" => Some(Self::declare()),
            _ => None,
        }
    }

    /// Return the same variant carrying `prefix`.
    #[must_use]
    pub fn with_table_path_prefix(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        match self {
            Self::Numeric { .. } => Self::Numeric {
                table_path_prefix: Some(prefix),
            },
            Self::Positional { .. } => Self::Positional {
                table_path_prefix: Some(prefix),
            },
            Self::Declare { .. } => Self::Declare {
                table_path_prefix: Some(prefix),
            },
            Self::TablePathPrefix { .. } => Self::TablePathPrefix {
                table_path_prefix: prefix,
            },
        }
    }

    /// The variant of this bind mode.
    #[must_use]
    pub fn kind(&self) -> BindKind {
        match self {
            Self::Numeric { .. } => BindKind::Numeric,
            Self::Positional { .. } => BindKind::Positional,
            Self::Declare { .. } => BindKind::Declare,
            Self::TablePathPrefix { .. } => BindKind::TablePathPrefix,
        }
    }

    /// The table path prefix, if any.
    #[must_use]
    pub fn table_path_prefix(&self) -> Option<&str> {
        match self {
            Self::Numeric { table_path_prefix }
            | Self::Positional { table_path_prefix }
            | Self::Declare { table_path_prefix } => table_path_prefix.as_deref(),
            Self::TablePathPrefix { table_path_prefix } => Some(table_path_prefix),
        }
    }
}

impl fmt::Display for BindKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Positional => "positional",
            Self::Declare => "declare",
            Self::TablePathPrefix => "table_path_prefix",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table_path_prefix() {
            Some(prefix) => write!(f, "{}({})", self.kind(), prefix),
            None => write!(f, "{}", self.kind()),
        }
    }
}
