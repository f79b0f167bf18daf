//! Process Runner
//!
//! Executes one external-tool invocation synchronously: spawn, measure
//! wall-clock time strictly around the child's lifetime, capture stdout and
//! stderr, and enforce an optional timeout. Timeout termination follows the
//! graceful pattern SIGTERM -> short wait -> SIGKILL so the tool gets a
//! chance to flush partial output.
//!
//! This is the only place in the workspace that creates a child process.

use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How often the child is polled for exit while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace period between SIGTERM and SIGKILL on timeout.
const TERM_GRACE: Duration = Duration::from_millis(50);

/// Invocation failures that prevent a result from being produced at all.
///
/// A timeout is deliberately not an error: it yields a degraded
/// [`RawInvocationResult`] instead.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The argument vector was empty
    #[error("empty command")]
    EmptyCommand,
    /// The child process could not be spawned or waited on
    #[error("failed to run benchmark process: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one invocation, never mutated after creation.
#[derive(Debug, Clone)]
pub struct RawInvocationResult {
    /// Wall-clock seconds around the invocation; `None` on timeout
    pub elapsed_seconds: Option<f64>,
    /// Child exit code; `None` on timeout or signal death
    pub exit_code: Option<i32>,
    /// Captured standard output (best-effort on timeout)
    pub stdout: String,
    /// Captured standard error (best-effort on timeout)
    pub stderr: String,
    /// Whether the configured timeout elapsed before the child exited
    pub timed_out: bool,
}

/// Synchronous child-process executor.
///
/// Not `Clone` on purpose: the orchestrator holds the only handle for a
/// configuration, which makes the no-overlapping-invocations rule structural
/// rather than conventional.
#[derive(Debug)]
pub struct ProcessRunner {
    _private: (),
}

impl ProcessRunner {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Run one command to completion or timeout.
    ///
    /// `argv` is already fully resolved into discrete arguments; no shell is
    /// involved. The elapsed time covers spawn through exit and excludes any
    /// setup or result assembly around it.
    pub fn run(
        &mut self,
        argv: &[String],
        timeout: Option<Duration>,
    ) -> Result<RawInvocationResult, RunnerError> {
        let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so timeout termination reaches any helper
        // processes the tool spawns and the output pipes actually close.
        unsafe {
            command.pre_exec(|| {
                libc::setpgid(0, 0);
                Ok(())
            });
        }

        let start = Instant::now();
        let mut child = command.spawn()?;

        // Drain both pipes off-thread so a chatty child can never fill a pipe
        // buffer and deadlock against our wait loop.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());
        let deadline = timeout.map(|t| start + t);

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let elapsed = start.elapsed().as_secs_f64();
                    return Ok(RawInvocationResult {
                        elapsed_seconds: Some(elapsed),
                        exit_code: status.code(),
                        stdout: join_reader(stdout_reader),
                        stderr: join_reader(stderr_reader),
                        timed_out: false,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    terminate(&mut child);
                    let _ = join_reader(stdout_reader);
                    let _ = join_reader(stderr_reader);
                    return Err(RunnerError::Io(e));
                }
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                terminate(&mut child);
                return Ok(RawInvocationResult {
                    elapsed_seconds: None,
                    exit_code: None,
                    stdout: join_reader(stdout_reader),
                    stderr: join_reader(stderr_reader),
                    timed_out: true,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Read a pipe to the end on a dedicated thread.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

/// Collect a reader thread's output; empty on any reader failure.
fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// SIGTERM, brief grace, then SIGKILL, delivered to the whole process
/// group. Once every member is dead the pipes close and the reader threads
/// finish with whatever was captured.
fn terminate(child: &mut Child) {
    signal_group(child.id(), libc::SIGTERM);
    thread::sleep(TERM_GRACE);
    if matches!(child.try_wait(), Ok(None) | Err(_)) {
        signal_group(child.id(), libc::SIGKILL);
    }
    let _ = child.wait();
}

/// Send a signal to the child's process group.
fn signal_group(pid: u32, signal: libc::c_int) {
    unsafe {
        libc::kill(-(pid as libc::pid_t), signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_captures_output_and_exit_code() {
        let mut runner = ProcessRunner::new();
        let result = runner
            .run(
                &argv(&["/bin/sh", "-c", "echo out; echo err 1>&2; exit 3"]),
                None,
            )
            .unwrap();
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(!result.timed_out);
        assert!(result.elapsed_seconds.unwrap() > 0.0);
    }

    #[test]
    fn test_timeout_terminates_child() {
        let mut runner = ProcessRunner::new();
        let start = Instant::now();
        let result = runner
            .run(
                &argv(&["/bin/sh", "-c", "echo started; sleep 30"]),
                Some(Duration::from_millis(300)),
            )
            .unwrap();
        assert!(result.timed_out);
        assert!(result.elapsed_seconds.is_none());
        assert!(result.exit_code.is_none());
        // Output produced before the kill is still captured best-effort
        assert!(result.stdout.contains("started"));
        // The 30s sleep must not have run to completion
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_empty_command_rejected() {
        let mut runner = ProcessRunner::new();
        assert!(matches!(
            runner.run(&[], None),
            Err(RunnerError::EmptyCommand)
        ));
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let mut runner = ProcessRunner::new();
        let result = runner.run(&argv(&["/nonexistent/sevenbench-tool"]), None);
        assert!(matches!(result, Err(RunnerError::Io(_))));
    }
}
