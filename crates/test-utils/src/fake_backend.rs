use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use streamexec::errors::{Result, StreamExecError};
use streamexec::exec::{ProcessBackend, ProcessOutput};

type Script = dyn Fn(&[String], usize) -> Result<ProcessOutput> + Send + Sync;

/// A fake process backend that:
/// - records the environment of every invocation
/// - answers each invocation from a script instead of spawning a process.
///
/// Clones share the same call log, so a test can keep one handle while the
/// pipeline owns another.
#[derive(Clone)]
pub struct ScriptedBackend {
    script: Arc<Script>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Duration,
    slow: Option<(String, Duration)>,
}

impl ScriptedBackend {
    /// Answer every call with `script(env, call_index)`.
    pub fn from_fn<F>(script: F) -> Self
    where
        F: Fn(&[String], usize) -> Result<ProcessOutput> + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            slow: None,
        }
    }

    /// Every call exits 0 and echoes its environment on stdout.
    pub fn succeeding() -> Self {
        Self::from_fn(|env, _| Ok(exited(0, &env.join(" "))))
    }

    /// Calls whose environment contains `marker` exit with `code`; the rest
    /// succeed.
    pub fn failing_when(marker: &str, code: i32) -> Self {
        let marker = marker.to_string();
        Self::from_fn(move |env, _| {
            if env.iter().any(|kv| kv == &marker) {
                Ok(exited(code, "failed"))
            } else {
                Ok(exited(0, &env.join(" ")))
            }
        })
    }

    /// The first `k` calls exit with `code`, later calls succeed.
    pub fn failing_first(k: usize, code: i32) -> Self {
        Self::from_fn(move |_, call| {
            if call < k {
                Ok(exited(code, &format!("attempt {}", call + 1)))
            } else {
                Ok(exited(0, &format!("attempt {}", call + 1)))
            }
        })
    }

    /// Every call fails to launch.
    pub fn unlaunchable() -> Self {
        Self::from_fn(|_, _| {
            Err(StreamExecError::Launch {
                command: "scripted".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        })
    }

    /// Make every call take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make calls whose environment contains `marker` take `delay` instead.
    pub fn with_slow_record(mut self, marker: &str, delay: Duration) -> Self {
        self.slow = Some((marker.to_string(), delay));
        self
    }

    fn delay_for(&self, env: &[String]) -> Duration {
        match &self.slow {
            Some((marker, delay)) if env.iter().any(|kv| kv == marker) => *delay,
            _ => self.delay,
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls that have started and not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ProcessBackend for ScriptedBackend {
    fn run<'a>(
        &'a self,
        _command: &'a str,
        env: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>> {
        Box::pin(async move {
            let call = {
                let mut guard = self.calls.lock().unwrap();
                guard.push(env.to_vec());
                guard.len() - 1
            };

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let delay = self.delay_for(env);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            (self.script)(env, call)
        })
    }
}

/// Build a process output with the given exit code and stdout.
pub fn exited(code: i32, stdout: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code: code,
        stdout: stdout.to_string(),
        stderr: if code == 0 {
            String::new()
        } else {
            format!("exit status {code}")
        },
    }
}
