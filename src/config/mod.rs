// src/config/mod.rs

//! Configuration loading and validation for streamexec.
//!
//! Responsibilities:
//! - Define the TOML-backed raw model and the resolved options (`model.rs`).
//! - Load an optional config file and layer CLI flags on top (`loader.rs`).
//! - Validate basic invariants like a non-empty command (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, resolve};
pub use model::{
    ExecutionOptions, RawConfig, ResolvedConfig, SinkPaths, DEFAULT_BUFFER_SIZE,
    DEFAULT_CONCURRENCY, DEFAULT_RETRY_DELAY_MS,
};
