// src/config/validate.rs

use crate::config::model::{RawConfig, ResolvedConfig};
use crate::errors::{Result, StreamExecError};

impl TryFrom<RawConfig> for ResolvedConfig {
    type Error = StreamExecError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        let command = validate_command(&raw)?;
        validate_limits(&raw)?;
        Ok(ResolvedConfig::new_unchecked(raw, command))
    }
}

fn validate_command(cfg: &RawConfig) -> Result<String> {
    match cfg.exec.as_deref().map(str::trim) {
        Some(cmd) if !cmd.is_empty() => Ok(cmd.to_string()),
        _ => Err(StreamExecError::ConfigError(
            "exec string can't be empty (pass --exec or set `exec` in the config file)"
                .to_string(),
        )),
    }
}

fn validate_limits(cfg: &RawConfig) -> Result<()> {
    if cfg.concurrency == 0 {
        return Err(StreamExecError::ConfigError(
            "concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.buffer_size == 0 {
        return Err(StreamExecError::ConfigError(
            "buffer_size must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.retry_delay_ms == 0 {
        return Err(StreamExecError::ConfigError(
            "retry_delay_ms must be >= 1 so that backoff grows between retries".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn raw_with_exec(exec: &str) -> RawConfig {
        RawConfig {
            exec: Some(exec.to_string()),
            ..RawConfig::default()
        }
    }

    #[test]
    fn defaults_resolve_with_a_command() {
        let cfg = ResolvedConfig::try_from(raw_with_exec("echo $a")).unwrap();
        assert_eq!(cfg.options.command, "echo $a");
        assert_eq!(cfg.options.concurrency, 10);
        assert_eq!(cfg.options.retries, 0);
        assert_eq!(cfg.options.buffer_size, 5000);
        assert_eq!(cfg.options.retry_delay, Duration::from_secs(1));
        assert!(!cfg.options.continue_on_error);
        assert!(cfg.sinks.output_log.is_none());
    }

    #[test]
    fn missing_or_blank_command_is_rejected() {
        for raw in [RawConfig::default(), raw_with_exec("   ")] {
            match ResolvedConfig::try_from(raw) {
                Err(StreamExecError::ConfigError(msg)) => assert!(msg.contains("exec")),
                other => panic!("expected ConfigError, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_limits_are_rejected() {
        let zero_concurrency = RawConfig {
            concurrency: 0,
            ..raw_with_exec("true")
        };
        let zero_buffer = RawConfig {
            buffer_size: 0,
            ..raw_with_exec("true")
        };
        let zero_delay = RawConfig {
            retry_delay_ms: 0,
            ..raw_with_exec("true")
        };

        for raw in [zero_concurrency, zero_buffer, zero_delay] {
            assert!(matches!(
                ResolvedConfig::try_from(raw),
                Err(StreamExecError::ConfigError(_))
            ));
        }
    }
}
