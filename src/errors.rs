// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::format::FormatError;

#[derive(Error, Debug)]
pub enum StreamExecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A record could not be turned into environment assignments.
    #[error("{source}, original data: {record:?}")]
    Parse {
        record: String,
        #[source]
        source: FormatError,
    },

    /// The shell could not be started at all. Never retried.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the input stream failed for a reason other than EOF.
    #[error("reading input stream failed: {0}")]
    InputStream(#[source] std::io::Error),

    #[error("writing to {sink} failed: {source}")]
    Sink {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StreamExecError {
    /// Short machine-readable tag used in structured error output.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamExecError::ConfigError(_) => "config",
            StreamExecError::IoError(_) => "io",
            StreamExecError::TomlError(_) => "config",
            StreamExecError::Parse { .. } => "parse",
            StreamExecError::Launch { .. } => "launch",
            StreamExecError::InputStream(_) => "input",
            StreamExecError::Sink { .. } => "sink",
            StreamExecError::Other(_) => "other",
        }
    }

    /// The offending record, when the error is tied to one.
    pub fn record(&self) -> Option<&str> {
        match self {
            StreamExecError::Parse { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Errors that halt the pipeline even with continue-on-error set.
    pub fn is_always_fatal(&self) -> bool {
        matches!(self, StreamExecError::InputStream(_))
    }
}

pub type Result<T> = std::result::Result<T, StreamExecError>;
