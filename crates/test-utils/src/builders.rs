#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use streamexec::config::ExecutionOptions;

/// Builder for `ExecutionOptions` to simplify test setup.
///
/// Starts from the production defaults, except for a 1ms retry delay so
/// retry tests stay fast.
pub struct OptionsBuilder {
    options: ExecutionOptions,
}

impl OptionsBuilder {
    pub fn new(command: &str) -> Self {
        let mut options = ExecutionOptions::new(command);
        options.retry_delay = Duration::from_millis(1);
        Self { options }
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.options.concurrency = n;
        self
    }

    pub fn retries(mut self, r: u32) -> Self {
        self.options.retries = r;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.options.retry_delay = delay;
        self
    }

    pub fn buffer_size(mut self, n: usize) -> Self {
        self.options.buffer_size = n;
        self
    }

    pub fn continue_on_error(mut self, val: bool) -> Self {
        self.options.continue_on_error = val;
        self
    }

    pub fn debug(mut self, val: bool) -> Self {
        self.options.debug = val;
        self
    }

    pub fn dry_run(mut self, val: bool) -> Self {
        self.options.dry_run = val;
        self
    }

    pub fn build(self) -> Arc<ExecutionOptions> {
        Arc::new(self.options)
    }
}

/// `n` JSON-lines records `{"id": 0}` .. `{"id": n-1}`, newline-terminated.
pub fn id_records(n: usize) -> String {
    (0..n).map(|i| format!("{{\"id\": {i}}}\n")).collect()
}
