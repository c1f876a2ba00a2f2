// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessBackend` trait that the rest of the
//!   crate runs commands through, so tests can replace real processes.
//! - [`shell`] is the production backend built on `tokio::process::Command`.
//! - [`retry`] wraps a backend with dry-run handling and the bounded
//!   retry-with-backoff policy.

pub mod backend;
pub mod retry;
pub mod shell;

pub use backend::{ProcessBackend, ProcessOutput};
pub use retry::{Backoff, RetryingExecutor};
pub use shell::ShellBackend;
