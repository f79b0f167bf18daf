#![warn(missing_docs)]
//! Sevenbench Report
//!
//! Assembles per-configuration run records from collected samples, emits
//! them as JSON, and aggregates many result files into Markdown/CSV
//! comparison tables. Field names at the serialization boundary are stable;
//! the aggregation side keys on them.

mod aggregate;
mod assemble;
mod json;
mod record;

pub use aggregate::{
    collect_result_files, row_from_file, sort_rows, write_csv, write_markdown, AggregateRow,
};
pub use assemble::assemble_run_record;
pub use json::generate_json;
pub use record::{PlatformInfo, RunRecord, RunStats};
