//! Parsed Report Data Structures
//!
//! Every field distinguishes "absent" from "zero": the tool omitting a
//! sub-column is not the same as it reporting 0, and downstream statistics
//! depend on that distinction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value extracted from the system-info section.
///
/// Scalar labels (RAM size, thread counts) carry one number; per-thread
/// CPU-frequency lines carry an ordered series of readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemValue {
    /// Single labeled number, e.g. `RAM size: 31908 MB`
    Scalar(u64),
    /// Ordered sequence of numbers, e.g. a `1T CPU Freq` reading series
    Series(Vec<u64>),
}

/// One phase of the timing breakdown, e.g. `Kernel Time = 0.900 = 1%`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    /// Wall-clock seconds attributed to the phase
    pub seconds: f64,
    /// Percentage relative to global time
    pub percent: i64,
}

/// One four-field metric group from the benchmark table.
///
/// The table reports each direction (compress/decompress) as four columns:
/// speed, CPU usage, rating normalized by usage, and the composite rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionMetrics {
    /// Speed in the unit the report's legend declares (KiB/s)
    pub speed: u64,
    /// CPU usage percentage (can exceed 100 with multiple threads)
    pub usage_percent: u64,
    /// Rating divided by usage (the report's R/U column)
    pub rating_per_usage: u64,
    /// Vendor-defined composite rating (MIPS)
    pub rating: u64,
}

/// One dictionary-size tier of the benchmark table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkTableRow {
    /// Dictionary size tier identifier (the log2 size before the colon)
    pub dict_size: u32,
    /// Compress-side metrics, absent if the report omitted the sub-columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<CompressionMetrics>,
    /// Decompress-side metrics, absent if the report omitted the sub-columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompress: Option<CompressionMetrics>,
}

/// The `Avr:` row of the benchmark table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageMetrics {
    /// Compress-side averages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<CompressionMetrics>,
    /// Decompress-side averages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompress: Option<CompressionMetrics>,
}

impl AverageMetrics {
    /// True when neither half of the averages row was found.
    pub fn is_empty(&self) -> bool {
        self.compress.is_none() && self.decompress.is_none()
    }
}

/// The `Tot:` row of the benchmark table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalMetrics {
    /// Combined CPU usage percentage
    pub usage_percent: u64,
    /// Combined rating per usage
    pub rating_per_usage: u64,
    /// Combined composite rating
    pub rating: u64,
}

/// Structured form of one `7z b -bt` console report.
///
/// Sections that could not be located are empty or `None`; the parser never
/// guesses values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    /// Labeled system-info values and per-thread CPU frequency series
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_info: BTreeMap<String, SystemValue>,
    /// Timing breakdown keyed by lowercase phase name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub timing: BTreeMap<String, PhaseTiming>,
    /// Per-dictionary-size rows in report order (ascending dictionary size)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benchmark_table: Vec<BenchmarkTableRow>,
    /// Averages row
    #[serde(default, skip_serializing_if = "AverageMetrics::is_empty")]
    pub averages: AverageMetrics,
    /// Totals row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<TotalMetrics>,
}

impl ParsedReport {
    /// True when nothing at all was extracted from the input text.
    pub fn is_empty(&self) -> bool {
        self.system_info.is_empty()
            && self.timing.is_empty()
            && self.benchmark_table.is_empty()
            && self.averages.is_empty()
            && self.totals.is_none()
    }
}
