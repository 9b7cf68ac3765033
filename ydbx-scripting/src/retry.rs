//! Retry policy for transient operation failures.
//!
//! The lazy client does not embed any retry logic; it hands every operation
//! to a [`Retryer`]. [`BackoffRetryer`] is the default strategy.
//!
//! Failed attempts are sorted into three classes:
//!
//! | error                                | class                 |
//! |--------------------------------------|-----------------------|
//! | `BadSession`                         | retried immediately   |
//! | `Transport`, `Unavailable`, `Timeout`| fast backoff          |
//! | `Overloaded`                         | slow backoff          |
//!
//! Everything else is returned to the caller as is. Under
//! [`RetryMode::NonIdempotent`], errors after which the server may already
//! have applied the script (`Transport`, `Timeout`) are not retried either.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use ydbx_scripting::{Backoff, BackoffRetryer, ClientError, RetryConfig, Retryer};
//!
//! # async fn example() -> Result<(), ClientError> {
//! let retryer = BackoffRetryer::new(
//!     RetryConfig::new()
//!         .max_retries(5)
//!         .fast_backoff(Backoff::new(Duration::from_millis(10), 4)),
//! );
//!
//! let ctx = CancellationToken::new();
//! let answer = retryer.retry(&ctx, || async { Ok::<_, ClientError>(42) }).await?;
//! assert_eq!(answer, 42);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::millis;
use crate::error::{ClientError, ClientResult};

/// Largest doubling exponent a backoff may use.
const MAX_CEILING: u32 = 16;

/// Exponential backoff curve: `slot * 2^min(attempt, ceiling)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Backoff {
    /// Delay before the first retry, in milliseconds in config files.
    #[serde(with = "millis")]
    pub slot: Duration,
    /// Number of doublings after which the delay stops growing.
    pub ceiling: u32,
}

impl Backoff {
    /// Backoff for errors that usually clear within milliseconds.
    pub const FAST: Self = Self::new(Duration::from_millis(5), 6);
    /// Backoff for server overload.
    pub const SLOW: Self = Self::new(Duration::from_secs(1), 6);

    /// Create a backoff curve.
    pub const fn new(slot: Duration, ceiling: u32) -> Self {
        Self { slot, ceiling }
    }

    /// Delay before retry number `attempt` (zero based), without jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let shift = attempt.min(self.ceiling).min(MAX_CEILING);
        self.slot.saturating_mul(1 << shift)
    }
}

/// Which backoff curve a failed attempt waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackoffKind {
    /// Retry right away.
    Immediate,
    /// Wait on the fast curve.
    Fast,
    /// Wait on the slow curve.
    Slow,
}

/// Whether the operations being retried may safely run twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// Retry every transient error.
    #[default]
    Idempotent,
    /// Retry only errors that guarantee the script did not run.
    NonIdempotent,
    /// Never retry.
    Never,
}

impl RetryMode {
    /// The backoff class for `error`, or `None` when it must not be retried.
    pub fn classify(&self, error: &ClientError) -> Option<BackoffKind> {
        let kind = match error {
            ClientError::BadSession(_) => BackoffKind::Immediate,
            ClientError::Unavailable(_) => BackoffKind::Fast,
            ClientError::Overloaded(_) => BackoffKind::Slow,
            ClientError::Transport(_) | ClientError::Timeout(_) => {
                if *self == Self::NonIdempotent {
                    return None;
                }
                BackoffKind::Fast
            }
            _ => return None,
        };
        (*self != Self::Never).then_some(kind)
    }
}

/// Retry policy: attempt budget, backoff curves and mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Curve for [`BackoffKind::Fast`].
    pub fast_backoff: Backoff,
    /// Curve for [`BackoffKind::Slow`].
    pub slow_backoff: Backoff,
    /// Randomize each delay within its upper half.
    pub jitter: bool,
    /// Which errors are retried.
    pub mode: RetryMode,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            fast_backoff: Backoff::FAST,
            slow_backoff: Backoff::SLOW,
            jitter: true,
            mode: RetryMode::Idempotent,
        }
    }
}

impl RetryConfig {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry budget.
    #[must_use]
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the fast backoff curve.
    #[must_use]
    pub fn fast_backoff(mut self, backoff: Backoff) -> Self {
        self.fast_backoff = backoff;
        self
    }

    /// Set the slow backoff curve.
    #[must_use]
    pub fn slow_backoff(mut self, backoff: Backoff) -> Self {
        self.slow_backoff = backoff;
        self
    }

    /// Use `backoff` for both curves.
    #[must_use]
    pub fn backoff(self, backoff: Backoff) -> Self {
        self.fast_backoff(backoff).slow_backoff(backoff)
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Set the retry mode.
    #[must_use]
    pub fn mode(mut self, mode: RetryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Delay before retry number `attempt` of class `kind`.
    ///
    /// With jitter the delay is drawn uniformly from the upper half of the
    /// curve's value.
    pub fn delay(&self, kind: BackoffKind, attempt: u32) -> Duration {
        let delay = match kind {
            BackoffKind::Immediate => return Duration::ZERO,
            BackoffKind::Fast => self.fast_backoff.delay(attempt),
            BackoffKind::Slow => self.slow_backoff.delay(attempt),
        };
        if !self.jitter {
            return delay;
        }
        let half = delay / 2;
        let spread = u64::try_from(half.as_nanos()).unwrap_or(u64::MAX);
        half + Duration::from_nanos(rand::thread_rng().gen_range(0..=spread))
    }
}

/// Strategy that runs a fallible operation until it succeeds, fails
/// permanently, or the caller cancels.
#[async_trait]
pub trait Retryer: Send + Sync {
    /// Run `op`, retrying per policy. Returns the last outcome, or
    /// [`ClientError::Cancelled`] once `ctx` fires.
    async fn retry<T, F, Fut>(&self, ctx: &CancellationToken, op: F) -> ClientResult<T>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = ClientResult<T>> + Send;
}

/// Retryer driven by a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct BackoffRetryer {
    config: RetryConfig,
}

impl BackoffRetryer {
    /// Create a retryer with the given policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The retry policy.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[async_trait]
impl Retryer for BackoffRetryer {
    async fn retry<T, F, Fut>(&self, ctx: &CancellationToken, mut op: F) -> ClientResult<T>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = ClientResult<T>> + Send,
    {
        let mut attempt: u32 = 0;
        loop {
            let result = tokio::select! {
                biased;
                () = ctx.cancelled() => {
                    debug!(attempt, "operation cancelled");
                    return Err(ClientError::Cancelled);
                }
                result = op() => result,
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let kind = match self.config.mode.classify(&err) {
                Some(kind) if attempt < self.config.max_retries => kind,
                _ => {
                    if attempt > 0 {
                        warn!(attempts = attempt + 1, error = %err, "operation failed, giving up");
                    }
                    return Err(err);
                }
            };

            let delay = self.config.delay(kind, attempt);
            warn!(
                attempt = attempt + 1,
                backoff = ?kind,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "operation failed, retrying"
            );

            tokio::select! {
                biased;
                () = ctx.cancelled() => {
                    debug!(attempt, "operation cancelled during backoff");
                    return Err(ClientError::Cancelled);
                }
                () = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig::new()
            .backoff(Backoff::new(Duration::from_millis(1), 0))
            .jitter(false)
    }

    #[test]
    fn test_backoff_doubles_until_ceiling() {
        let backoff = Backoff::new(Duration::from_millis(5), 3);
        let delays: Vec<_> = (0..6).map(|n| backoff.delay(n).as_millis()).collect();
        assert_eq!(delays, vec![5, 10, 20, 40, 40, 40]);
    }

    #[test]
    fn test_backoff_huge_ceiling_saturates() {
        let backoff = Backoff::new(Duration::MAX, u32::MAX);
        assert_eq!(backoff.delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_delay_by_kind() {
        let config = RetryConfig::new()
            .fast_backoff(Backoff::new(Duration::from_millis(10), 2))
            .slow_backoff(Backoff::new(Duration::from_secs(2), 2))
            .jitter(false);

        assert_eq!(config.delay(BackoffKind::Immediate, 5), Duration::ZERO);
        assert_eq!(config.delay(BackoffKind::Fast, 1), Duration::from_millis(20));
        assert_eq!(config.delay(BackoffKind::Slow, 4), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_stays_in_upper_half() {
        let config = RetryConfig::new().fast_backoff(Backoff::new(Duration::from_millis(100), 0));
        for _ in 0..100 {
            let delay = config.delay(BackoffKind::Fast, 0);
            assert!(delay >= Duration::from_millis(50));
            assert!(delay <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_classify_idempotent() {
        let mode = RetryMode::Idempotent;
        assert_eq!(
            mode.classify(&ClientError::BadSession("expired".into())),
            Some(BackoffKind::Immediate)
        );
        assert_eq!(mode.classify(&ClientError::transport("reset")), Some(BackoffKind::Fast));
        assert_eq!(
            mode.classify(&ClientError::Overloaded("busy".into())),
            Some(BackoffKind::Slow)
        );
        assert_eq!(mode.classify(&ClientError::query("syntax")), None);
        assert_eq!(mode.classify(&ClientError::Cancelled), None);
        assert_eq!(mode.classify(&ClientError::Closed), None);
    }

    #[test]
    fn test_classify_non_idempotent() {
        let mode = RetryMode::NonIdempotent;
        assert_eq!(mode.classify(&ClientError::transport("reset")), None);
        assert_eq!(mode.classify(&ClientError::Timeout("1s".into())), None);
        assert_eq!(
            mode.classify(&ClientError::Unavailable("no endpoints".into())),
            Some(BackoffKind::Fast)
        );
    }

    #[test]
    fn test_classify_never() {
        assert_eq!(
            RetryMode::Never.classify(&ClientError::BadSession("expired".into())),
            None
        );
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let retryer = BackoffRetryer::new(fast_config());
        let attempts = &AtomicU32::new(0);
        let ctx = CancellationToken::new();

        let result = retryer
            .retry(&ctx, || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ClientError::transport("reset"))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let retryer = BackoffRetryer::new(fast_config().max_retries(2));
        let attempts = &AtomicU32::new(0);
        let ctx = CancellationToken::new();

        let result: ClientResult<()> = retryer
            .retry(&ctx, || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Overloaded("busy".into()))
            })
            .await;

        assert_eq!(result, Err(ClientError::Overloaded("busy".into())));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_returned_verbatim() {
        let retryer = BackoffRetryer::new(fast_config());
        let attempts = &AtomicU32::new(0);
        let ctx = CancellationToken::new();

        let result: ClientResult<()> = retryer
            .retry(&ctx, || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::query("unknown column"))
            })
            .await;

        assert_eq!(result, Err(ClientError::query("unknown column")));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let retryer = BackoffRetryer::default();
        let attempts = &AtomicU32::new(0);
        let ctx = CancellationToken::new();
        ctx.cancel();

        let result: ClientResult<()> = retryer
            .retry(&ctx, || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(result, Err(ClientError::Cancelled));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_attempt() {
        let retryer = BackoffRetryer::default();
        let ctx = CancellationToken::new();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let started = tokio::time::Instant::now();
        let result: ClientResult<()> = retryer
            .retry(&ctx, futures::future::pending::<ClientResult<()>>)
            .await;

        assert_eq!(result, Err(ClientError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let retryer = BackoffRetryer::new(
            RetryConfig::new()
                .max_retries(100)
                .backoff(Backoff::new(Duration::from_secs(60), 0))
                .jitter(false),
        );
        let attempts = Arc::new(AtomicU32::new(0));
        let ctx = CancellationToken::new();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let started = tokio::time::Instant::now();
        let result: ClientResult<()> = retryer
            .retry(&ctx, || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(ClientError::transport("reset"))
                }
            })
            .await;

        assert_eq!(result, Err(ClientError::Cancelled));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_session_retried_without_delay() {
        let retryer = BackoffRetryer::new(RetryConfig::new().backoff(Backoff::SLOW));
        let attempts = &AtomicU32::new(0);
        let ctx = CancellationToken::new();

        let started = tokio::time::Instant::now();
        let result = retryer
            .retry(&ctx, || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ClientError::BadSession("expired".into()))
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(result, Ok(()));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
