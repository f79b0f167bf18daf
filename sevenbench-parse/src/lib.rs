#![warn(missing_docs)]
//! Sevenbench Report Parser
//!
//! Turns the free-form console report of `7z b -bt` into structured data.
//! The report is semi-structured plain text with several interleaved
//! sections: system info lines, per-thread CPU frequency lines, a
//! pipe-delimited benchmark table with per-dictionary-size rows plus
//! averages and totals, and kernel/user/process/global timing lines.
//!
//! The parser is total: any input (empty, truncated, garbage) yields a
//! [`ParsedReport`] with the unparseable sections simply absent. One
//! malformed line never corrupts the rest of the extracted data.

mod parser;
mod report;

pub use parser::parse_report;
pub use report::{
    AverageMetrics, BenchmarkTableRow, CompressionMetrics, ParsedReport, PhaseTiming, SystemValue,
    TotalMetrics,
};
