// src/report/render.rs

//! Human and structured renderings of results and errors.

use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};

use crate::errors::StreamExecError;
use crate::types::ExecutionResult;

const OK_GLYPH: &str = "✔";
const FAIL_GLYPH: &str = "✘";

/// Renders the human-readable block for each report.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    debug: bool,
    color: bool,
}

impl TextRenderer {
    /// Colour follows the environment (`NO_COLOR`, `TERM=dumb`).
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            color: color_enabled(),
        }
    }

    /// Never emits escape codes.
    pub fn plain(debug: bool) -> Self {
        Self {
            debug,
            color: false,
        }
    }

    /// One block per result:
    ///
    /// ```text
    /// ✘ <stdout>
    ///   exit code: 3
    ///   <stderr lines>
    /// ```
    ///
    /// Under debug the command, attempts and environment follow.
    pub fn render_result(&self, result: &ExecutionResult) -> String {
        let mut out = String::new();

        if result.succeeded {
            out.push_str(&self.green(OK_GLYPH));
        } else {
            out.push_str(&self.red(FAIL_GLYPH));
        }
        let stdout = result.stdout.trim();
        if !stdout.is_empty() {
            out.push(' ');
            out.push_str(stdout);
        }
        out.push('\n');

        if !result.succeeded {
            out.push_str(&format!("  exit code: {}\n", result.exit_code));
        }

        for line in result.stderr.trim().lines() {
            let line = if result.succeeded {
                self.yellow(line)
            } else {
                self.red(line)
            };
            out.push_str(&format!("  {line}\n"));
        }

        if self.debug {
            out.push_str(&format!("  exec: {}\n", result.params.exec_string));
            out.push_str(&format!("  attempts: {}\n", result.attempts));
            out.push_str(&format!("  env: {:?}\n", result.envvars));
        }

        out
    }

    pub fn render_error(&self, err: &StreamExecError) -> String {
        format!("{} {err}\n", self.red("Error:"))
    }

    fn green(&self, s: &str) -> String {
        if self.color {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    fn red(&self, s: &str) -> String {
        if self.color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    fn yellow(&self, s: &str) -> String {
        if self.color {
            s.yellow().to_string()
        } else {
            s.to_string()
        }
    }
}

fn color_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false)
}

/// Compact JSON line for a result.
pub fn structured_result(result: &ExecutionResult) -> String {
    serde_json::to_string(result)
        .unwrap_or_else(|e| json!({ "Error": format!("unserializable result: {e}") }).to_string())
}

/// Compact JSON line for an error: `{"Error":..,"Kind":..,"Record":..}`.
pub fn structured_error(err: &StreamExecError) -> String {
    let mut map = Map::new();
    map.insert("Error".to_string(), Value::String(err.to_string()));
    map.insert("Kind".to_string(), Value::String(err.kind().to_string()));
    if let Some(record) = err.record() {
        map.insert("Record".to_string(), Value::String(record.to_string()));
    }
    Value::Object(map).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format_env;
    use crate::types::Params;

    fn result(succeeded: bool) -> ExecutionResult {
        ExecutionResult {
            envvars: vec!["id=7".to_string()],
            params: Params {
                exec_string: "./sync.sh".to_string(),
            },
            stderr: if succeeded { String::new() } else { "no such user\n".to_string() },
            stdout: "  synced 7\n".to_string(),
            exit_code: if succeeded { 0 } else { 4 },
            attempts: 1,
            succeeded,
        }
    }

    #[test]
    fn success_block_is_a_single_line() {
        let text = TextRenderer::plain(false).render_result(&result(true));
        assert_eq!(text, "✔ synced 7\n");
    }

    #[test]
    fn failure_block_carries_exit_code_and_stderr() {
        let text = TextRenderer::plain(false).render_result(&result(false));
        assert_eq!(text, "✘ synced 7\n  exit code: 4\n  no such user\n");
    }

    #[test]
    fn debug_block_adds_command_and_environment() {
        let text = TextRenderer::plain(true).render_result(&result(true));
        assert!(text.contains("  exec: ./sync.sh\n"));
        assert!(text.contains("  env: [\"id=7\"]\n"));
    }

    #[test]
    fn coloured_failure_wraps_glyph_in_escape_codes() {
        let renderer = TextRenderer {
            debug: false,
            color: true,
        };
        let text = renderer.render_result(&result(false));
        assert!(text.contains("\u{1b}["));
        assert!(text.contains(FAIL_GLYPH));
    }

    #[test]
    fn structured_error_includes_the_record() {
        let source = format_env("nope").unwrap_err();
        let err = StreamExecError::Parse {
            record: "nope".to_string(),
            source,
        };
        let value: Value = serde_json::from_str(&structured_error(&err)).unwrap();
        assert_eq!(value["Kind"], "parse");
        assert_eq!(value["Record"], "nope");
        assert!(value["Error"].as_str().unwrap().contains("invalid JSON"));
    }

    #[test]
    fn structured_result_is_one_line() {
        let line = structured_result(&result(false));
        assert!(!line.contains('\n'));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ExitCode"], 4);
        assert_eq!(value["Succeeded"], false);
    }
}
