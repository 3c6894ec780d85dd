use anyhow::{Result, anyhow};
use std::io;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::domain::models::LoggingConfig;

/// Initialize the global tracing subscriber from the logging config.
///
/// The configured level is the default; `RUST_LOG` still overrides it
/// per module. Safe to call once per process.
///
/// # Errors
/// Returns an error if the level is unrecognized or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let default_level = parse_log_level(&config.level)?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    match config.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(io::stdout)
            .with_current_span(true)
            .with_target(true)
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?,
        "pretty" => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(env_filter)
            .with_writer(io::stdout)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?,
        other => return Err(anyhow!("unknown log format: {other}")),
    }

    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(anyhow!("unknown log level: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_log_level("loud").is_err());
    }
}
