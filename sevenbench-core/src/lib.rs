#![warn(missing_docs)]
//! Sevenbench Core
//!
//! Drives the external 7-Zip binary in benchmark mode: one configuration is
//! executed for exactly N strictly sequential iterations, each invocation is
//! timed, its console report parsed, and the outcome captured as one
//! immutable sample.
//!
//! ## Data Flow
//!
//! ```text
//! RunConfiguration
//!       │
//!       ▼
//! ┌──────────────┐   per iteration   ┌───────────────┐
//! │ Orchestrator │ ────────────────▶ │ ProcessRunner │  spawn, time, capture
//! └──────┬───────┘                   └───────┬───────┘
//!        │                                   │
//!        │        RawInvocationResult        │
//!        │◀──────────────────────────────────┘
//!        │
//!        ▼
//!  SampleRecord (throughput token + parsed report + raw log reference)
//! ```
//!
//! Sequential execution is structural: the orchestrator owns the only
//! [`ProcessRunner`] handle for its configuration, so two invocations of the
//! same configuration can never overlap and skew the measurements.

mod config;
mod orchestrator;
mod runner;

pub use config::{ConfigError, RunConfiguration, DEFAULT_TOOL};
pub use orchestrator::{
    extract_throughput, DiscardSink, Orchestrator, RawLogSink, SampleRecord,
};
pub use runner::{ProcessRunner, RawInvocationResult, RunnerError};
