//! Logging setup for ydbx.
//!
//! Every ydbx crate logs through `tracing`; nothing is printed unless a
//! subscriber is installed. With the `tracing-subscriber` feature enabled,
//! [`init`] installs one driven by environment variables.
//!
//! # Environment Variables
//!
//! - `YDBX_DEBUG=true|1|yes` - Enable debug logging
//! - `YDBX_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific log level
//! - `YDBX_LOG_FORMAT=json|pretty|compact` - Set the output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use ydbx_scripting::logging;
//!
//! // Call once at startup; later calls do nothing.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Enables debug logging.
pub const ENV_DEBUG: &str = "YDBX_DEBUG";
/// Overrides the log level.
pub const ENV_LOG_LEVEL: &str = "YDBX_LOG_LEVEL";
/// Selects the output format.
pub const ENV_LOG_FORMAT: &str = "YDBX_LOG_FORMAT";

/// Whether `YDBX_DEBUG` is set to "true", "1" or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(ENV_DEBUG)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

/// The log level from `YDBX_LOG_LEVEL`.
///
/// Falls back to "debug" when `YDBX_DEBUG` is enabled and to "warn" otherwise.
pub fn get_log_level() -> &'static str {
    env::var(ENV_LOG_LEVEL)
        .ok()
        .and_then(|level| parse_level(&level))
        .unwrap_or_else(|| if is_debug_enabled() { "debug" } else { "warn" })
}

/// The log format from `YDBX_LOG_FORMAT`, defaulting to "json".
pub fn get_log_format() -> &'static str {
    env::var(ENV_LOG_FORMAT)
        .map(|f| parse_format(&f))
        .unwrap_or("json")
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_level(value: &str) -> Option<&'static str> {
    match value.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn parse_format(value: &str) -> &'static str {
    match value.to_lowercase().as_str() {
        "pretty" => "pretty",
        "compact" => "compact",
        _ => "json",
    }
}

/// Filter directive covering every ydbx crate at `level`.
#[cfg_attr(not(feature = "tracing-subscriber"), allow(dead_code))]
fn filter_directive(level: &str) -> String {
    format!("ydbx={level},ydbx_dsn={level},ydbx_scripting={level}")
}

/// Initialize logging from the environment.
///
/// Does nothing unless `YDBX_DEBUG` or `YDBX_LOG_LEVEL` is set. Only the
/// first call to [`init`] or [`init_with_level`] has any effect.
pub fn init() {
    if !is_debug_enabled() && env::var(ENV_LOG_LEVEL).is_err() {
        return;
    }
    install(get_log_level(), get_log_format());
}

/// Initialize logging at `level`, ignoring `YDBX_DEBUG` and `YDBX_LOG_LEVEL`.
///
/// Unknown levels fall back to "warn".
///
/// ```rust,no_run
/// use ydbx_scripting::logging;
///
/// logging::init_with_level("trace");
/// ```
pub fn init_with_level(level: &str) {
    install(parse_level(level).unwrap_or("warn"), get_log_format());
}

#[cfg_attr(not(feature = "tracing-subscriber"), allow(unused_variables))]
fn install(level: &'static str, format: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter =
                EnvFilter::try_new(filter_directive(level)).unwrap_or_else(|_| EnvFilter::new("warn"));

            let result = match format {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            // Another subscriber may already be installed by the application.
            if result.is_ok() {
                tracing::info!(level, format, "ydbx logging initialized");
            }
        }
    });
}
