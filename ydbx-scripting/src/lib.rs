//! # ydbx-scripting
//!
//! Lazily constructed, retrying scripting client for ydbx.
//!
//! This crate provides:
//! - [`ScriptingClient`], the scripting operations (`execute`, `explain`,
//!   `stream_execute`, `close`)
//! - [`ClientBuilder`], the seam that builds the real client
//! - [`LazyScripting`], which builds the client on first use, exactly once,
//!   and runs every operation through a [`Retryer`]
//! - [`BackoffRetryer`], exponential backoff driven by [`RetryConfig`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use ydbx_scripting::prelude::*;
//!
//! let scripting = LazyScripting::new(
//!     builder,
//!     [ScriptingOption::Retry(RetryConfig::new().max_retries(5))],
//! );
//!
//! let ctx = CancellationToken::new();
//! let params = QueryParameters::new().with("id", 42);
//! let result = scripting
//!     .execute(&ctx, "DECLARE $id AS Int32; SELECT $id;", &params)
//!     .await?;
//! println!("{} rows", result.row_count());
//!
//! scripting.close(&ctx).await?;
//! ```
//!
//! ## Configuration
//!
//! [`ScriptingConfig`] can be loaded from TOML; durations are milliseconds:
//!
//! ```toml
//! operation_timeout = 5000
//!
//! [retry]
//! max_retries = 5
//! mode = "non_idempotent"
//!
//! [retry.fast_backoff]
//! slot = 10
//! ceiling = 4
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod lazy;
pub mod logging;
pub mod retry;
pub mod types;

pub use client::{ClientBuilder, ScriptingClient};
pub use config::{ScriptingConfig, ScriptingOption};
pub use error::{ClientError, ClientResult};
pub use lazy::LazyScripting;
pub use retry::{Backoff, BackoffKind, BackoffRetryer, RetryConfig, RetryMode, Retryer};
pub use types::{
    Column, ExplainMode, Explanation, QueryParameters, QueryResult, ResultSet, StreamResult, Value,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{ClientBuilder, ScriptingClient};
    pub use crate::config::{ScriptingConfig, ScriptingOption};
    pub use crate::error::{ClientError, ClientResult};
    pub use crate::lazy::LazyScripting;
    pub use crate::retry::{Backoff, BackoffRetryer, RetryConfig, RetryMode, Retryer};
    pub use crate::types::{ExplainMode, Explanation, QueryParameters, QueryResult, StreamResult};
}
