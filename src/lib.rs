//! # ydbx
//!
//! Connection string resolution and a lazily constructed scripting client
//! for YDB.
//!
//! ydbx provides:
//! - DSN parsing into ordered driver and connector options ([`dsn`])
//! - A scripting client that is built on first use, exactly once, with
//!   retries around every operation ([`scripting`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use ydbx::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dsn = ydbx::dsn::parse("grpcs://ydb.example.com:2135/prod?query_mode=scripting")?;
//!     let builder = MyBuilder::connect(dsn.config()).await?;
//!
//!     let scripting = LazyScripting::new(builder, []);
//!     let ctx = CancellationToken::new();
//!     let result = scripting
//!         .execute(&ctx, "SELECT 1;", &QueryParameters::new())
//!         .await?;
//!
//!     scripting.close(&ctx).await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Connection string parsing and driver options.
pub mod dsn {
    pub use ydbx_dsn::*;
}

/// Lazy, retrying scripting client.
pub mod scripting {
    pub use ydbx_scripting::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dsn::{Bind, Config, Connector, Dsn, DsnError, QueryMode};
    pub use ydbx_scripting::prelude::*;
}

// Re-export key types at the crate root
pub use dsn::{Dsn, DsnError};
pub use scripting::{ClientError, LazyScripting};
