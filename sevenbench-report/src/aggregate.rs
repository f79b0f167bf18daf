//! Cross-File Aggregation
//!
//! Scans a results directory for run-record JSON files and condenses them
//! into one comparison table, emitted as Markdown and CSV. Deliberately
//! defensive: a file that cannot be read or parsed is skipped, and missing
//! fields become empty cells rather than failures, since records may come
//! from older schema versions or other platforms.

use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Column order of the aggregate table; also the CSV header.
const COLUMNS: &[&str] = &[
    "file",
    "platform_node",
    "cpu_model",
    "physical_cores",
    "logical_cores",
    "ht",
    "mmt",
    "mx",
    "iterations",
    "md",
    "avg_s",
    "stddev_s",
    "throughput_MB_s",
];

/// One summary row extracted from a single run-record file.
#[derive(Debug, Clone, Default)]
pub struct AggregateRow {
    /// Source file name
    pub file: String,
    /// Host the record was collected on
    pub platform_node: Option<String>,
    /// CPU model name
    pub cpu_model: Option<String>,
    /// Physical cores per socket
    pub physical_cores: Option<u64>,
    /// Logical CPU count
    pub logical_cores: Option<u64>,
    /// Hyper-threading heuristic flag
    pub ht: Option<bool>,
    /// Compression level under test
    pub mx: Option<u64>,
    /// Thread count under test
    pub mmt: Option<u64>,
    /// Dictionary size (log2) under test
    pub md: Option<u64>,
    /// Iteration count
    pub iterations: Option<u64>,
    /// Mean elapsed seconds
    pub avg_s: Option<f64>,
    /// Elapsed standard deviation
    pub stddev_s: Option<f64>,
    /// Mean throughput in MB/s
    pub throughput_mb_s: Option<f64>,
}

impl AggregateRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.file.clone(),
            opt_string(&self.platform_node),
            opt_string(&self.cpu_model),
            opt_display(self.physical_cores),
            opt_display(self.logical_cores),
            opt_display(self.ht),
            opt_display(self.mmt),
            opt_display(self.mx),
            opt_display(self.iterations),
            opt_display(self.md),
            opt_display(self.avg_s),
            opt_display(self.stddev_s),
            opt_display(self.throughput_mb_s),
        ]
    }
}

fn opt_string(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Collect run-record JSON files under `dir`, recursively, skipping anything
/// inside a `raw/` directory. Paths are returned sorted for stable output.
pub fn collect_result_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().map(|n| n == "raw").unwrap_or(false) {
                continue;
            }
            walk(&path, files)?;
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
    Ok(())
}

/// Extract one summary row from a run-record file.
///
/// Returns `None` when the file cannot be read or is not JSON; individual
/// missing fields degrade to empty cells instead.
pub fn row_from_file(path: &Path) -> Option<AggregateRow> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable result file");
            return None;
        }
    };
    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed result file");
            return None;
        }
    };

    let platform = &value["platform"];
    let params = &value["params"];
    let stats = &value["stats"];

    Some(AggregateRow {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        platform_node: platform["hostname"].as_str().map(str::to_string),
        cpu_model: platform["model_name"].as_str().map(str::to_string),
        physical_cores: platform["cores_per_socket"].as_u64(),
        logical_cores: platform["logical_cpus"].as_u64(),
        ht: platform["ht"].as_bool(),
        mx: params["mx"].as_u64(),
        mmt: params["mmt"].as_u64(),
        md: params["md"].as_u64(),
        iterations: params["iterations"].as_u64(),
        avg_s: stats["elapsed"]["mean"].as_f64(),
        stddev_s: stats["elapsed"]["stdev"].as_f64(),
        throughput_mb_s: stats["throughput_MB_s"]["mean"].as_f64(),
    })
}

/// Sort rows for readability: host first, then compression level, then
/// thread count.
pub fn sort_rows(rows: &mut [AggregateRow]) {
    rows.sort_by(|a, b| {
        let key_a = (a.platform_node.clone().unwrap_or_default(), a.mx, a.mmt);
        let key_b = (b.platform_node.clone().unwrap_or_default(), b.mx, b.mmt);
        key_a.cmp(&key_b)
    });
}

/// Write the aggregate table as a Markdown file.
pub fn write_markdown(rows: &[AggregateRow], path: &Path) -> io::Result<()> {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", COLUMNS.join(" | "));
    let _ = writeln!(out, "|{}|", vec!["---"; COLUMNS.len()].join("|"));
    for row in rows {
        let _ = writeln!(out, "| {} |", row.cells().join(" | "));
    }
    fs::write(path, out)
}

/// Write the aggregate table as a CSV file.
pub fn write_csv(rows: &[AggregateRow], path: &Path) -> io::Result<()> {
    let mut out = String::new();
    let _ = writeln!(out, "{}", COLUMNS.join(","));
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| csv_escape(c)).collect();
        let _ = writeln!(out, "{}", cells.join(","));
    }
    fs::write(path, out)
}

/// Quote a CSV cell only when it needs it.
fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
