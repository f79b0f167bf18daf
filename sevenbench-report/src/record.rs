//! Run Record Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sevenbench_core::{RunConfiguration, SampleRecord};
use sevenbench_stats::AggregateStats;

/// Platform metadata collected by the caller before a run.
///
/// Linux-specific fields (lscpu-derived) gracefully degrade to `None` on
/// other platforms. The hyper-threading flag is a documented best-effort
/// heuristic (logical count greater than cores per socket) and misclassifies
/// multi-socket non-hyperthreaded machines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Operating system name
    pub os: String,
    /// Machine architecture
    pub arch: String,
    /// Host name
    pub hostname: String,
    /// CPU model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Logical CPU count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_cpus: Option<u32>,
    /// Hardware threads per core
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads_per_core: Option<u32>,
    /// Physical cores per socket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores_per_socket: Option<u32>,
    /// Best-effort hyper-threading heuristic
    #[serde(rename = "ht", skip_serializing_if = "Option::is_none")]
    pub hyper_threading: Option<bool>,
}

/// The two aggregate statistics every run carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Statistics over non-absent elapsed times, seconds
    pub elapsed: AggregateStats,
    /// Statistics over non-absent throughput samples, MB/s
    #[serde(rename = "throughput_MB_s")]
    pub throughput_mb_s: AggregateStats,
}

/// Top-level output: one record per configuration run, write-once.
///
/// Downstream consumers treat this as read-only; the field names here are
/// the JSON contract the aggregation tooling keys on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// UTC time the run was collected
    pub collected_at: DateTime<Utc>,
    /// Platform metadata
    pub platform: PlatformInfo,
    /// The exact command line that was invoked
    pub command_line: String,
    /// The configuration under test
    #[serde(rename = "params")]
    pub configuration: RunConfiguration,
    /// Per-iteration samples in execution order
    pub samples: Vec<SampleRecord>,
    /// Aggregate statistics
    pub stats: RunStats,
}
