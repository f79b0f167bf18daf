//! Iteration Orchestrator
//!
//! Runs exactly `iterations` invocations for one configuration, strictly in
//! sequence, with a blocking cooldown between runs. A timeout or spawn
//! failure becomes a degraded sample (note attached, numeric fields absent)
//! rather than aborting the run: the run always completes and always yields
//! one sample per attempted iteration, in execution order.
//!
//! Cancellation is cooperative: a shared flag checked between iterations
//! stops the run early while keeping every sample already collected.

use crate::config::{ConfigError, RunConfiguration};
use crate::runner::{ProcessRunner, RawInvocationResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

/// Where raw per-iteration console text goes when it is not kept inline.
///
/// The implementation lives outside the core (typically a file writer); the
/// orchestrator only records the reference it returns.
pub trait RawLogSink {
    /// Persist one iteration's stdout/stderr, returning a reference to the
    /// stored location (or `None` if nothing was stored).
    fn persist(&mut self, run_index: u32, stdout: &str, stderr: &str) -> Option<String>;
}

/// Sink that stores nothing.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl RawLogSink for DiscardSink {
    fn persist(&mut self, _run_index: u32, _stdout: &str, _stderr: &str) -> Option<String> {
        None
    }
}

/// Outcome of one iteration, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// 1-based execution index
    #[serde(rename = "run")]
    pub run_index: u32,
    /// Wall-clock seconds for the invocation; `None` on timeout/failure
    #[serde(rename = "elapsed_s")]
    pub elapsed_seconds: Option<f64>,
    /// Child exit code, recorded verbatim even when non-zero
    #[serde(rename = "returncode")]
    pub exit_code: Option<i32>,
    /// Legacy scalar throughput scraped from the console text, MB/s
    #[serde(rename = "throughput_MB_s")]
    pub throughput_mb_s: Option<f64>,
    /// Structured report parsed from stdout
    #[serde(rename = "report", skip_serializing_if = "Option::is_none")]
    pub parsed_report: Option<sevenbench_parse::ParsedReport>,
    /// Reference to externally persisted raw output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_log: Option<String>,
    /// Raw stdout, present only when configured to keep raw text inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_stdout: Option<String>,
    /// Raw stderr, present only when configured to keep raw text inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_stderr: Option<String>,
    /// Degradation note, e.g. "timeout"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SampleRecord {
    fn degraded(run_index: u32, note: String) -> Self {
        Self {
            run_index,
            elapsed_seconds: None,
            exit_code: None,
            throughput_mb_s: None,
            parsed_report: None,
            raw_log: None,
            raw_stdout: None,
            raw_stderr: None,
            note: Some(note),
        }
    }
}

/// Extract the legacy "<number> MB/s" (or "<number> KB/s", divided by 1024)
/// throughput token from combined console output.
pub fn extract_throughput(text: &str) -> Option<f64> {
    static MB: OnceLock<Regex> = OnceLock::new();
    static KB: OnceLock<Regex> = OnceLock::new();
    let mb = MB.get_or_init(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*MB/s").expect("static regex"));
    let kb = KB.get_or_init(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*KB/s").expect("static regex"));

    if let Some(caps) = mb.captures(text) {
        return caps[1].parse::<f64>().ok();
    }
    if let Some(caps) = kb.captures(text) {
        return caps[1].parse::<f64>().ok().map(|v| v / 1024.0);
    }
    None
}

/// Drives one configuration through its iterations.
///
/// Owns the only [`ProcessRunner`] for this configuration; the sample list
/// grows only here and is handed out frozen when the run finishes.
pub struct Orchestrator<S: RawLogSink> {
    config: RunConfiguration,
    argv: Vec<String>,
    runner: ProcessRunner,
    sink: S,
    keep_raw: bool,
    cancel: Arc<AtomicBool>,
}

impl<S: RawLogSink> Orchestrator<S> {
    /// Build an orchestrator, rejecting invalid configurations up front.
    pub fn new(
        config: RunConfiguration,
        tool: &str,
        sink: S,
        keep_raw: bool,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let argv = config.command(tool);
        Ok(Self {
            config,
            argv,
            runner: ProcessRunner::new(),
            sink,
            keep_raw,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag that aborts remaining iterations when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The exact command line under test.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Run all iterations; see [`Orchestrator::run_with`].
    pub fn run(&mut self) -> Vec<SampleRecord> {
        self.run_with(|_| {})
    }

    /// Run all iterations, invoking `on_sample` after each one completes.
    ///
    /// Returns exactly `iterations` samples in execution order unless
    /// cancelled, in which case the samples collected so far are returned.
    pub fn run_with(&mut self, mut on_sample: impl FnMut(&SampleRecord)) -> Vec<SampleRecord> {
        let iterations = self.config.iterations;
        let timeout = self.config.timeout();
        let cooldown = self.config.cooldown();
        let mut samples = Vec::with_capacity(iterations as usize);

        for run_index in 1..=iterations {
            if self.cancel.load(Ordering::Relaxed) {
                tracing::warn!(
                    completed = samples.len(),
                    "run cancelled, keeping samples collected so far"
                );
                break;
            }

            tracing::debug!(run = run_index, total = iterations, command = %self.command_line(), "starting iteration");
            let sample = match self.runner.run(&self.argv, timeout) {
                Ok(raw) if raw.timed_out => {
                    tracing::warn!(run = run_index, "invocation timed out");
                    SampleRecord::degraded(run_index, "timeout".to_string())
                }
                Ok(raw) => self.assemble_sample(run_index, raw),
                Err(e) => {
                    tracing::warn!(run = run_index, error = %e, "invocation failed");
                    SampleRecord::degraded(run_index, format!("invocation failed: {}", e))
                }
            };

            on_sample(&sample);
            samples.push(sample);

            if run_index != iterations && !cooldown.is_zero() {
                thread::sleep(cooldown);
            }
        }

        samples
    }

    /// Turn one completed invocation into a sample: scrape the throughput
    /// token from the combined output, parse the structured report from
    /// stdout, and either inline the raw text or hand it to the sink.
    fn assemble_sample(&mut self, run_index: u32, raw: RawInvocationResult) -> SampleRecord {
        let combined = format!("{}\n{}", raw.stdout, raw.stderr);
        let throughput = extract_throughput(&combined);
        // Non-zero exits still get a parse attempt over whatever was printed
        let report = sevenbench_parse::parse_report(&raw.stdout);

        let (raw_log, raw_stdout, raw_stderr) = if self.keep_raw {
            (None, Some(raw.stdout), Some(raw.stderr))
        } else {
            let reference = self.sink.persist(run_index, &raw.stdout, &raw.stderr);
            (reference, None, None)
        };

        SampleRecord {
            run_index,
            elapsed_seconds: raw.elapsed_seconds.map(round_micro),
            exit_code: raw.exit_code,
            throughput_mb_s: throughput.map(round_micro),
            parsed_report: Some(report),
            raw_log,
            raw_stdout,
            raw_stderr,
            note: None,
        }
    }
}

/// Round to microsecond precision for stable serialized output.
fn round_micro(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
