//! Result and Raw-Log File Layout
//!
//! One JSON blob per configuration run under the output directory, raw
//! per-iteration console text under `raw/`. File names carry the UTC stamp
//! and the configuration so runs from several hosts can be merged into one
//! directory tree and aggregated later.

use chrono::{DateTime, Utc};
use sevenbench_core::RawLogSink;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Compact UTC stamp used in file names, e.g. `20240101T120000Z`.
pub fn file_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Path of the run-record JSON for one configuration run.
pub fn result_path(outdir: &Path, stamp: &str, mx: u32, mmt: u32) -> PathBuf {
    outdir.join(format!("{}_mx{}_mmt{}.json", stamp, mx, mmt))
}

/// Sink that writes each iteration's raw console text to its own log file
/// and hands the path back as the sample's reference.
pub struct RawFileSink {
    raw_dir: PathBuf,
    stamp: String,
    mx: u32,
    mmt: u32,
}

impl RawFileSink {
    /// Create the sink; `raw_dir` must already exist.
    pub fn new(raw_dir: PathBuf, stamp: String, mx: u32, mmt: u32) -> Self {
        Self {
            raw_dir,
            stamp,
            mx,
            mmt,
        }
    }

    fn write_log(&self, path: &Path, stdout: &str, stderr: &str) -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        writeln!(file, "=== STDOUT ===")?;
        file.write_all(stdout.as_bytes())?;
        writeln!(file, "\n=== STDERR ===")?;
        file.write_all(stderr.as_bytes())?;
        Ok(())
    }
}

impl RawLogSink for RawFileSink {
    fn persist(&mut self, run_index: u32, stdout: &str, stderr: &str) -> Option<String> {
        let path = self.raw_dir.join(format!(
            "{}_mx{}_mmt{}_run{}.log",
            self.stamp, self.mx, self.mmt, run_index
        ));
        match self.write_log(&path, stdout, stderr) {
            Ok(()) => Some(path.to_string_lossy().into_owned()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to persist raw log");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stamp_format() {
        let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(file_stamp(at), "20240102T030405Z");
    }

    #[test]
    fn test_result_path_shape() {
        let path = result_path(Path::new("results"), "20240102T030405Z", 5, 4);
        assert_eq!(
            path,
            Path::new("results").join("20240102T030405Z_mx5_mmt4.json")
        );
    }

    #[test]
    fn test_sink_writes_sectioned_log() {
        let dir = std::env::temp_dir().join(format!("sevenbench-cli-sink-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let mut sink = RawFileSink::new(dir.clone(), "stamp".to_string(), 5, 4);
        let reference = sink.persist(2, "out text", "err text").unwrap();
        assert!(reference.ends_with("stamp_mx5_mmt4_run2.log"));

        let content = fs::read_to_string(&reference).unwrap();
        assert!(content.starts_with("=== STDOUT ===\nout text"));
        assert!(content.contains("=== STDERR ===\nerr text"));
    }
}
