#![warn(missing_docs)]
//! Sevenbench Statistics
//!
//! Reduces a sequence of numeric samples (elapsed seconds, throughput) into
//! count/mean/median/standard-deviation. The aggregator is pure and tolerates
//! degenerate inputs: an empty sequence yields `count = 0` with no central
//! statistics populated, and a single sample yields `stdev = 0.0` (sample
//! standard deviation is undefined for n = 1, so we pin it rather than emit
//! NaN).

use serde::{Deserialize, Serialize};

/// Aggregate statistics over one numeric sample sequence.
///
/// `mean`/`median`/`stdev` are `None` exactly when `count == 0`; they are
/// omitted from serialized output in that case so downstream tooling never
/// sees a fabricated zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of samples the statistics were computed over
    pub count: usize,
    /// Arithmetic mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    /// Median (midpoint average for even counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Sample standard deviation (n - 1 denominator), 0.0 when count == 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdev: Option<f64>,
}

impl AggregateStats {
    /// Statistics for an empty sample sequence
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: None,
            median: None,
            stdev: None,
        }
    }
}

/// Compute aggregate statistics over a sequence of values.
///
/// The input must already be filtered: callers drop absent samples before
/// aggregation rather than encoding them as sentinel zeros.
pub fn aggregate(values: &[f64]) -> AggregateStats {
    if values.is_empty() {
        return AggregateStats::empty();
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if count % 2 == 0 {
        let mid = count / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[count / 2]
    };

    let stdev = if count < 2 {
        0.0
    } else {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    AggregateStats {
        count,
        mean: Some(mean),
        median: Some(median),
        stdev: Some(stdev),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_aggregate() {
        let stats = aggregate(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert!((stats.mean.unwrap() - 3.0).abs() < 1e-9);
        assert!((stats.median.unwrap() - 3.0).abs() < 1e-9);
        // Sample stdev of 1..=5 is sqrt(2.5)
        assert!((stats.stdev.unwrap() - 2.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_even_count_median() {
        let stats = aggregate(&[4.0, 1.0, 3.0, 2.0]);
        assert!((stats.median.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_count_matches_input_length() {
        for n in 1..=8 {
            let values: Vec<f64> = (0..n).map(|v| v as f64).collect();
            assert_eq!(aggregate(&values).count, n);
        }
    }

    #[test]
    fn test_single_sample_pins_stdev_to_zero() {
        let stats = aggregate(&[42.0]);
        assert_eq!(stats.count, 1);
        assert!((stats.mean.unwrap() - 42.0).abs() < 1e-9);
        assert!((stats.median.unwrap() - 42.0).abs() < 1e-9);
        assert_eq!(stats.stdev, Some(0.0));
    }

    #[test]
    fn test_empty_input() {
        let stats = aggregate(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
        assert!(stats.median.is_none());
        assert!(stats.stdev.is_none());
    }

    #[test]
    fn test_empty_serializes_without_central_stats() {
        let json = serde_json::to_value(aggregate(&[])).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 0 }));
    }

    #[test]
    fn test_populated_serialization_field_names() {
        let json = serde_json::to_value(aggregate(&[2.0, 2.0])).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["count"], 2);
        assert!(obj.contains_key("mean"));
        assert!(obj.contains_key("median"));
        assert!(obj.contains_key("stdev"));
    }
}
