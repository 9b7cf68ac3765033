//! Scripting client seams.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::ScriptingConfig;
use crate::error::ClientResult;
use crate::types::{ExplainMode, Explanation, QueryParameters, QueryResult, StreamResult};

/// Operations of a scripting service client.
///
/// Every operation takes the caller's cancellation token; implementations
/// should stop promptly once it fires.
#[async_trait]
pub trait ScriptingClient: Send + Sync {
    /// Execute a script and materialize its result sets.
    async fn execute(
        &self,
        ctx: &CancellationToken,
        query: &str,
        params: &QueryParameters,
    ) -> ClientResult<QueryResult>;

    /// Explain a script.
    async fn explain(
        &self,
        ctx: &CancellationToken,
        query: &str,
        mode: ExplainMode,
    ) -> ClientResult<Explanation>;

    /// Execute a script and stream its result sets.
    async fn stream_execute(
        &self,
        ctx: &CancellationToken,
        query: &str,
        params: &QueryParameters,
    ) -> ClientResult<StreamResult>;

    /// Release the client's resources.
    async fn close(&self, ctx: &CancellationToken) -> ClientResult<()>;
}

/// Constructs the real scripting client on first use.
///
/// Implementations hold whatever connection handle the client needs.
#[async_trait]
pub trait ClientBuilder: Send + Sync {
    /// The client this builder produces.
    type Client: ScriptingClient + 'static;

    /// Build a client with `config`.
    async fn build(
        &self,
        ctx: &CancellationToken,
        config: &ScriptingConfig,
    ) -> ClientResult<Self::Client>;
}
