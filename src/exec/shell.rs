// src/exec/shell.rs

//! Production backend: run the command under the platform shell.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{Result, StreamExecError};
use crate::exec::backend::{ProcessBackend, ProcessOutput};

/// Runs commands via `sh -c` (`cmd /C` on Windows) with a cleared
/// environment, capturing stdout and stderr separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBackend;

impl ShellBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for ShellBackend {
    fn run<'a>(
        &'a self,
        command: &'a str,
        env: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>> {
        Box::pin(run_shell(command, env))
    }
}

async fn run_shell(command: &str, env: &[String]) -> Result<ProcessOutput> {
    let mut cmd = shell_command(command);

    cmd.env_clear()
        .envs(env.iter().filter_map(|kv| split_assignment(kv)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| StreamExecError::Launch {
        command: command.to_string(),
        source,
    })?;

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for process of `{command}`"))?;

    let exit_code = output.status.code().unwrap_or(-1);
    debug!(exit_code, success = output.status.success(), "process exited");

    Ok(ProcessOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Build a shell command appropriate for the platform.
fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        // Absolute path: the child environment has no PATH to search.
        let mut c = Command::new("/bin/sh");
        c.arg("-c").arg(command);
        c
    }
}

fn split_assignment(assignment: &str) -> Option<(&str, &str)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.is_empty() => Some((key, value)),
        _ => {
            warn!(assignment, "dropping environment entry without a usable key");
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn env(pairs: &[&str]) -> Vec<String> {
        pairs.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn environment_is_exactly_the_assignments() {
        let backend = ShellBackend::new();
        let out = backend
            .run(
                r#"echo "$a-$b"; echo "home=${HOME:-unset}" >&2"#,
                &env(&["a=1", "b=two words"]),
            )
            .await
            .unwrap();

        assert!(out.success());
        assert_eq!(out.stdout, "1-two words\n");
        assert_eq!(out.stderr, "home=unset\n");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_output_not_an_error() {
        let out = ShellBackend::new()
            .run("echo oops >&2; exit 3", &[])
            .await
            .unwrap();
        assert_eq!(out.exit_code, 3);
        assert!(!out.success());
        assert_eq!(out.stderr, "oops\n");
    }

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(split_assignment("e={\"z\":\"x=1\"}"), Some(("e", "{\"z\":\"x=1\"}")));
        assert_eq!(split_assignment("n="), Some(("n", "")));
        assert_eq!(split_assignment("=oops"), None);
        assert_eq!(split_assignment("novalue"), None);
    }
}
