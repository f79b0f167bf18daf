//! Run Record Assembly
//!
//! Merges platform metadata, the resolved configuration, and the frozen
//! sample sequence into one immutable record. Statistics are computed over
//! only the non-absent values of each field, so a run where every iteration
//! timed out still assembles cleanly with `count = 0` statistics.

use crate::record::{PlatformInfo, RunRecord, RunStats};
use chrono::{DateTime, Utc};
use sevenbench_core::{RunConfiguration, SampleRecord};
use sevenbench_stats::aggregate;

/// Assemble the final record for one configuration run.
pub fn assemble_run_record(
    collected_at: DateTime<Utc>,
    platform: PlatformInfo,
    configuration: RunConfiguration,
    command_line: String,
    samples: Vec<SampleRecord>,
) -> RunRecord {
    let elapsed: Vec<f64> = samples.iter().filter_map(|s| s.elapsed_seconds).collect();
    let throughput: Vec<f64> = samples.iter().filter_map(|s| s.throughput_mb_s).collect();

    RunRecord {
        collected_at,
        platform,
        command_line,
        configuration,
        stats: RunStats {
            elapsed: aggregate(&elapsed),
            throughput_mb_s: aggregate(&throughput),
        },
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration() -> RunConfiguration {
        RunConfiguration {
            compression_level: 9,
            thread_count: 2,
            dictionary_log2_size: 24,
            iterations: 3,
            cooldown_seconds: 0.0,
            timeout_seconds: Some(60.0),
        }
    }

    fn sample(run_index: u32, elapsed: Option<f64>, throughput: Option<f64>) -> SampleRecord {
        SampleRecord {
            run_index,
            elapsed_seconds: elapsed,
            exit_code: elapsed.map(|_| 0),
            throughput_mb_s: throughput,
            parsed_report: None,
            raw_log: None,
            raw_stdout: None,
            raw_stderr: None,
            note: elapsed.is_none().then(|| "timeout".to_string()),
        }
    }

    #[test]
    fn test_stats_skip_absent_values() {
        let samples = vec![
            sample(1, Some(10.0), Some(100.0)),
            sample(2, None, None),
            sample(3, Some(20.0), Some(200.0)),
        ];
        let record = assemble_run_record(
            Utc::now(),
            PlatformInfo::default(),
            configuration(),
            "7z b -mmt=2 -mx=9 -md=24 -bt".to_string(),
            samples,
        );
        assert_eq!(record.samples.len(), 3);
        assert_eq!(record.stats.elapsed.count, 2);
        assert!((record.stats.elapsed.mean.unwrap() - 15.0).abs() < 1e-9);
        assert_eq!(record.stats.throughput_mb_s.count, 2);
        assert!((record.stats.throughput_mb_s.mean.unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_timeouts_still_assemble() {
        let samples = vec![sample(1, None, None), sample(2, None, None)];
        let record = assemble_run_record(
            Utc::now(),
            PlatformInfo::default(),
            configuration(),
            String::new(),
            samples,
        );
        assert_eq!(record.stats.elapsed.count, 0);
        assert!(record.stats.elapsed.mean.is_none());
        assert_eq!(record.stats.throughput_mb_s.count, 0);
    }

    #[test]
    fn test_top_level_serialization_keys() {
        let record = assemble_run_record(
            Utc::now(),
            PlatformInfo::default(),
            configuration(),
            "cmd".to_string(),
            vec![sample(1, Some(1.0), None)],
        );
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "collected_at",
            "platform",
            "command_line",
            "params",
            "samples",
            "stats",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        let stats = obj["stats"].as_object().unwrap();
        assert!(stats.contains_key("elapsed"));
        assert!(stats.contains_key("throughput_MB_s"));
    }
}
