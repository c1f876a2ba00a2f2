// src/format/env.rs

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Anything outside this set is not portable in an environment variable name.
static INVALID_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9_]").expect("static regex is valid"));

/// Why a record could not be formatted.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parse one record and flatten its top-level fields into `KEY=VALUE` pairs.
///
/// Keys are sanitized with [`sanitize_key`]; values are encoded with
/// [`encode_value`]. The order follows the decoder's map order.
pub fn format_env(record: &str) -> Result<Vec<String>, FormatError> {
    let value: Value = serde_json::from_str(record)?;
    let object = match value {
        Value::Object(map) => map,
        other => return Err(FormatError::NotAnObject(kind_of(&other))),
    };
    Ok(assignments(object))
}

fn assignments(object: Map<String, Value>) -> Vec<String> {
    object
        .into_iter()
        .map(|(key, value)| format!("{}={}", sanitize_key(&key), encode_value(&value)))
        .collect()
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_key(key: &str) -> String {
    INVALID_KEY_CHARS.replace_all(key, "_").into_owned()
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => encode_number(n),
        Value::String(s) => s.clone(),
        // Compact re-encoding of nested values cannot fail for a `Value`.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn encode_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        // Integral floats print as plain integers, never in exponent form.
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
