// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{RawConfig, ResolvedConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfig`.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`resolve`] for the full CLI + file + validation pipeline.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Resolve the effective configuration for a run.
///
/// - Start from the config file given by `--config`, or from defaults.
/// - Apply every flag the user passed on the command line.
/// - Validate the result.
pub fn resolve(args: &CliArgs) -> Result<ResolvedConfig> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawConfig::default(),
    };
    args.apply_to(&mut raw);
    ResolvedConfig::try_from(raw)
}
