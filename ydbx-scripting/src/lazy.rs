//! Lazily constructed scripting client.
//!
//! [`LazyScripting`] defers building the real client until the first
//! operation needs it, builds it at most once no matter how many callers
//! race for it, and runs every operation through a [`Retryer`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use ydbx_scripting::{LazyScripting, QueryParameters, ScriptingClient};
//!
//! let scripting = LazyScripting::new(builder, []);
//! let ctx = CancellationToken::new();
//!
//! // Nothing has been built yet; the first call builds the client.
//! let result = scripting
//!     .execute(&ctx, "SELECT 1;", &QueryParameters::new())
//!     .await?;
//!
//! scripting.close(&ctx).await?;
//! ```

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ClientBuilder, ScriptingClient};
use crate::config::{ScriptingConfig, ScriptingOption};
use crate::error::{ClientError, ClientResult};
use crate::retry::{BackoffRetryer, Retryer};
use crate::types::{ExplainMode, Explanation, QueryParameters, QueryResult, StreamResult};

/// State of the client slot.
enum LazyState<C> {
    /// Not yet built.
    Uninitialized,
    /// Built and shared with callers.
    Initialized(Arc<C>),
    /// Closed; terminal.
    Closed,
}

impl<C> LazyState<C> {
    fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized(_) => "Initialized",
            Self::Closed => "Closed",
        }
    }
}

/// A scripting client that is built on first use.
///
/// The construct-or-fetch step and `close` run under the same lock, so a
/// close racing a first use is fully ordered with it. A failed construction
/// is not cached; the next call tries again. Once closed, every operation
/// fails with [`ClientError::Closed`] and further closes succeed without
/// doing anything.
pub struct LazyScripting<B: ClientBuilder, R = BackoffRetryer> {
    builder: B,
    config: ScriptingConfig,
    retryer: R,
    state: Mutex<LazyState<B::Client>>,
}

impl<B: ClientBuilder> LazyScripting<B, BackoffRetryer> {
    /// Create a lazy client that retries with the configured backoff policy.
    pub fn new(builder: B, options: impl IntoIterator<Item = ScriptingOption>) -> Self {
        let config = ScriptingConfig::new(options);
        let retryer = BackoffRetryer::new(config.retry().clone());
        Self::with_retryer(builder, config, retryer)
    }
}

impl<B: ClientBuilder, R: Retryer> LazyScripting<B, R> {
    /// Create a lazy client with a custom retry strategy.
    pub fn with_retryer(builder: B, config: ScriptingConfig, retryer: R) -> Self {
        Self {
            builder,
            config,
            retryer,
            state: Mutex::new(LazyState::Uninitialized),
        }
    }

    /// The configuration handed to the builder.
    pub fn config(&self) -> &ScriptingConfig {
        &self.config
    }

    /// Whether the underlying client has been built and not closed.
    pub async fn is_initialized(&self) -> bool {
        matches!(*self.state.lock().await, LazyState::Initialized(_))
    }

    /// Whether the client has been closed.
    pub async fn is_closed(&self) -> bool {
        matches!(*self.state.lock().await, LazyState::Closed)
    }

    /// Fetch the underlying client, building it if needed.
    async fn client(&self, ctx: &CancellationToken) -> ClientResult<Arc<B::Client>> {
        let mut state = self.state.lock().await;

        if let LazyState::Initialized(client) = &*state {
            return Ok(Arc::clone(client));
        }
        if matches!(*state, LazyState::Closed) {
            return Err(ClientError::Closed);
        }
        if ctx.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let client = match self.builder.build(ctx, &self.config).await {
            Ok(client) => Arc::new(client),
            Err(err) => {
                warn!(error = %err, "failed to construct scripting client");
                return Err(err);
            }
        };
        info!(
            operation_timeout = ?self.config.operation_timeout(),
            "scripting client constructed"
        );

        *state = LazyState::Initialized(Arc::clone(&client));
        Ok(client)
    }
}

#[async_trait]
impl<B, R> ScriptingClient for LazyScripting<B, R>
where
    B: ClientBuilder,
    R: Retryer,
{
    async fn execute(
        &self,
        ctx: &CancellationToken,
        query: &str,
        params: &QueryParameters,
    ) -> ClientResult<QueryResult> {
        let client = self.client(ctx).await?;
        self.retryer
            .retry(ctx, || client.execute(ctx, query, params))
            .await
    }

    async fn explain(
        &self,
        ctx: &CancellationToken,
        query: &str,
        mode: ExplainMode,
    ) -> ClientResult<Explanation> {
        let client = self.client(ctx).await?;
        self.retryer
            .retry(ctx, || client.explain(ctx, query, mode))
            .await
    }

    async fn stream_execute(
        &self,
        ctx: &CancellationToken,
        query: &str,
        params: &QueryParameters,
    ) -> ClientResult<StreamResult> {
        let client = self.client(ctx).await?;
        self.retryer
            .retry(ctx, || client.stream_execute(ctx, query, params))
            .await
    }

    async fn close(&self, ctx: &CancellationToken) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, LazyState::Closed) {
            LazyState::Initialized(client) => {
                debug!("closing scripting client");
                client.close(ctx).await.inspect_err(|err| {
                    warn!(error = %err, "failed to close scripting client");
                })
            }
            LazyState::Uninitialized | LazyState::Closed => Ok(()),
        }
    }
}

impl<B: ClientBuilder, R> fmt::Debug for LazyScripting<B, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .state
            .try_lock()
            .map_or("Locked", |state| state.name());
        f.debug_struct("LazyScripting")
            .field("config", &self.config)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
