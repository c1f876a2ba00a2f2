// src/logging.rs

//! Logging setup for `streamexec` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `--debug` (implies `debug`)
//! 3. `STREAMEXEC_LOG` environment variable (e.g. "info", "debug")
//! 4. default to `info`
//!
//! Logs are sent to STDERR so that stdout carries only result output.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, debug: bool) -> Result<()> {
    let level = resolve_level(
        cli_level,
        debug,
        std::env::var("STREAMEXEC_LOG").ok().as_deref(),
    );

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>, debug: bool, env: Option<&str>) -> tracing::Level {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None if debug => tracing::Level::DEBUG,
        None => env.and_then(parse_level_str).unwrap_or(tracing::Level::INFO),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_debug_and_env() {
        let level = resolve_level(Some(LogLevel::Warn), true, Some("trace"));
        assert_eq!(level, tracing::Level::WARN);
    }

    #[test]
    fn debug_flag_wins_over_env() {
        assert_eq!(resolve_level(None, true, Some("error")), tracing::Level::DEBUG);
    }

    #[test]
    fn env_then_default() {
        assert_eq!(resolve_level(None, false, Some(" Warning ")), tracing::Level::WARN);
        assert_eq!(resolve_level(None, false, Some("bogus")), tracing::Level::INFO);
        assert_eq!(resolve_level(None, false, None), tracing::Level::INFO);
    }
}
