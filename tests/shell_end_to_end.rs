// tests/shell_end_to_end.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, json_lines, run_pipeline};

use std::io::Cursor;

use streamexec::exec::ShellBackend;
use streamexec_test_utils::builders::OptionsBuilder;

#[tokio::test]
async fn record_fields_become_the_command_environment() {
    init_tracing();

    let input = "{\"name\": \"ada\", \"age\": 36}\n{\"name\": \"alan\", \"age\": 41.0}\n";
    let options = OptionsBuilder::new("echo \"$name is $age\"")
        .concurrency(2)
        .build();

    let (summary, sinks) = run_pipeline(options, ShellBackend::new(), Cursor::new(input)).await;

    assert_eq!(summary.stats.succeeded, 2);
    let mut lines = sinks.text_out.lines();
    lines.sort();
    assert_eq!(lines, vec!["✔ ada is 36", "✔ alan is 41"]);
}

#[tokio::test]
async fn sanitized_keys_are_visible_to_the_shell() {
    init_tracing();

    let input = "{\"user-id\": 7, \"nested\": {\"k\": [1, 2]}}\n";
    let options = OptionsBuilder::new("echo \"$user_id $nested\"").build();

    let (_summary, sinks) = run_pipeline(options, ShellBackend::new(), Cursor::new(input)).await;

    let results = json_lines(&sinks.structured_out.lines());
    assert_eq!(results[0]["Stdout"], "7 {\"k\":[1,2]}\n");
}

#[tokio::test]
async fn environment_is_only_the_record() {
    init_tracing();

    let options = OptionsBuilder::new("echo \"[$HOME]\"").build();

    let (_summary, sinks) =
        run_pipeline(options, ShellBackend::new(), Cursor::new("{\"a\": 1}\n")).await;

    assert_eq!(sinks.text_out.contents(), "✔ []\n");
}

#[tokio::test]
async fn failing_command_keeps_stdout_stderr_and_exit_code() {
    init_tracing();

    let options = OptionsBuilder::new("echo out; echo oops >&2; exit 3")
        .continue_on_error(true)
        .build();

    let (summary, sinks) =
        run_pipeline(options, ShellBackend::new(), Cursor::new("{\"a\": 1}\n")).await;

    assert_eq!(summary.stats.failed, 1);
    assert_eq!(summary.exit_code(), 0);

    let failures = json_lines(&sinks.structured_err.lines());
    assert_eq!(failures[0]["ExitCode"], 3);
    assert_eq!(failures[0]["Stdout"], "out\n");
    assert_eq!(failures[0]["Stderr"], "oops\n");
    assert_eq!(failures[0]["Params"]["ExecString"], "echo out; echo oops >&2; exit 3");
    assert_eq!(
        sinks.text_err.contents(),
        "✘ out\n  exit code: 3\n  oops\n"
    );
}
