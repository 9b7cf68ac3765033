//! # ydbx-dsn
//!
//! Connection string resolution for the ydbx client.
//!
//! A connection string is turned into two ordered option lists:
//!
//! - [`ConfigOption`]s, applied to a [`Config`] (TLS flag, endpoint, database)
//! - [`ConnectorOption`]s, applied to a [`Connector`] (default query mode,
//!   parameter bind mode)
//!
//! ## Connection String Format
//!
//! ```text
//! grpc://host:port/database?query_mode=scripting
//! grpcs://host:port/database?go_auto_bind=numeric&go_auto_bind.table_path_prefix=path/to/tables
//! ```
//!
//! | parameter                        | values                                          |
//! |----------------------------------|-------------------------------------------------|
//! | `query_mode`                     | `data`, `explain`, `scan`, `scheme`, `scripting` |
//! | `go_auto_bind`                   | `numeric`, `positional`, `declare`              |
//! | `go_auto_bind.table_path_prefix` | any path                                        |
//!
//! Unknown parameters are ignored.
//!
//! ## Example
//!
//! ```rust
//! use ydbx_dsn::{Bind, QueryMode};
//!
//! let dsn = ydbx_dsn::parse(
//!     "grpc://localhost:2135/local?go_auto_bind.table_path_prefix=path/to/tables",
//! )
//! .unwrap();
//!
//! let connector = dsn.connector();
//! assert_eq!(connector.default_query_mode(), QueryMode::Data);
//! assert_eq!(
//!     connector.bind(),
//!     Some(&Bind::table_path_prefix_only("path/to/tables"))
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bind;
mod config;
mod connector;
mod dsn;
mod error;

pub use bind::{Bind, BindKind};
pub use config::{Config, ConfigBuilder, ConfigOption};
pub use connector::{Connector, ConnectorOption, QueryMode};
pub use dsn::{Dsn, ENV_CONNECTION_STRING, parse, parse_env, parse_from_env};
pub use error::{DsnError, DsnResult};
