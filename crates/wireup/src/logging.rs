//! Structured logging with tracing
//!
//! Configures the tracing subscriber for applications embedding the engine.
//! Libraries emit through the `tracing` macros only; calling this is the
//! host application's choice.

use crate::error::{Error, Result};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize logging at the given level. The `WIREUP_LOG` environment
/// variable takes precedence when set.
pub fn init_logging(level: &str) -> Result<()> {
    let level = parse_log_level(level)?;
    let filter = EnvFilter::try_from_env("WIREUP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let stdout = fmt::layer().with_target(true);
    Registry::default().with(filter).with(stdout).init();

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse a log level string to a tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::internal(format!(
            "invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}
