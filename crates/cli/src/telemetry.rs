//! Logging setup
//!
//! Everything goes to stderr so the child's stdout stays untouched.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `--log-level` nor `RUST_LOG` is set
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Initialize the global subscriber
///
/// Filter priority: `level` (from `--log-level`/`ENVETCD_LOG_LEVEL`), then
/// `RUST_LOG`, then `warn`. Format comes from `ENVETCD_LOG_FORMAT`.
///
/// # Example
///
/// ```text
/// ENVETCD_LOG_FORMAT=json envetcd -l debug --system web -- ./server
/// ```
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let env_filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL)),
    }
    .with_context(|| format!("invalid log level: {}", level.unwrap_or(DEFAULT_LOG_LEVEL)))?;

    let log_format = std::env::var("ENVETCD_LOG_FORMAT").unwrap_or_default();

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    Ok(())
}
