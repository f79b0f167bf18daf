//! Run Configuration
//!
//! One resolved configuration under test: compression level, thread count,
//! dictionary size, iteration count, and the per-run timeout/cooldown knobs.
//! Resolution of defaults and precedence happens upstream; this type only
//! enforces the single hard invariant (`iterations >= 1`) and knows how to
//! spell the exact command line the downstream parser depends on.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Tool invoked when no override is configured.
pub const DEFAULT_TOOL: &str = "7z";

/// Configuration invariant violations.
///
/// These signal caller programming errors and are rejected before any
/// invocation is attempted; everything that happens at runtime (timeouts,
/// non-zero exits, garbage output) is a degraded sample instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `iterations` must be at least 1
    #[error("iteration count must be at least 1, got {0}")]
    InvalidIterations(u32),
    /// `cooldown_s` must not be negative
    #[error("cooldown must not be negative, got {0}")]
    InvalidCooldown(f64),
}

/// One benchmark configuration, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    /// 7z compression level (`-mx`), e.g. 1, 5, 9
    #[serde(rename = "mx")]
    pub compression_level: u32,
    /// 7z thread count (`-mmt`)
    #[serde(rename = "mmt")]
    pub thread_count: u32,
    /// 7z dictionary size as log2 (`-md`), e.g. 26 for 64 MiB
    #[serde(rename = "md")]
    pub dictionary_log2_size: u32,
    /// Number of wrapper-driven iterations, at least 1
    pub iterations: u32,
    /// Blocking pause between iterations, seconds
    #[serde(rename = "cooldown_s")]
    pub cooldown_seconds: f64,
    /// Per-invocation timeout, seconds; `None` means unbounded
    #[serde(rename = "timeout_s")]
    pub timeout_seconds: Option<f64>,
}

impl RunConfiguration {
    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations < 1 {
            return Err(ConfigError::InvalidIterations(self.iterations));
        }
        if self.cooldown_seconds < 0.0 {
            return Err(ConfigError::InvalidCooldown(self.cooldown_seconds));
        }
        Ok(())
    }

    /// The fully resolved argument vector for one invocation.
    ///
    /// Flag spelling and order are part of the contract: the report parser
    /// depends on the output format of exactly `{tool} b -mmt= -mx= -md= -bt`.
    pub fn command(&self, tool: &str) -> Vec<String> {
        vec![
            tool.to_string(),
            "b".to_string(),
            format!("-mmt={}", self.thread_count),
            format!("-mx={}", self.compression_level),
            format!("-md={}", self.dictionary_log2_size),
            "-bt".to_string(),
        ]
    }

    /// Space-joined command line for logs and the serialized record.
    pub fn command_line(&self, tool: &str) -> String {
        self.command(tool).join(" ")
    }

    /// Per-invocation timeout as a `Duration`, if bounded.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .filter(|t| *t > 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Cooldown pause as a `Duration`, zero when disabled.
    pub fn cooldown(&self) -> Duration {
        if self.cooldown_seconds > 0.0 {
            Duration::from_secs_f64(self.cooldown_seconds)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfiguration {
        RunConfiguration {
            compression_level: 5,
            thread_count: 4,
            dictionary_log2_size: 26,
            iterations: 3,
            cooldown_seconds: 0.5,
            timeout_seconds: None,
        }
    }

    #[test]
    fn test_command_spelling_and_order() {
        assert_eq!(
            config().command("7z"),
            vec!["7z", "b", "-mmt=4", "-mx=5", "-md=26", "-bt"]
        );
        assert_eq!(config().command_line("7z"), "7z b -mmt=4 -mx=5 -md=26 -bt");
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut cfg = config();
        cfg.iterations = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidIterations(0))
        ));
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let mut cfg = config();
        cfg.cooldown_seconds = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_timeout_mapping() {
        let mut cfg = config();
        assert!(cfg.timeout().is_none());
        cfg.timeout_seconds = Some(2.5);
        assert_eq!(cfg.timeout(), Some(Duration::from_millis(2500)));
        cfg.timeout_seconds = Some(0.0);
        assert!(cfg.timeout().is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let cfg = config();
        let json = serde_json::to_value(&cfg).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["mx"], 5);
        assert_eq!(obj["mmt"], 4);
        assert_eq!(obj["md"], 26);
        assert_eq!(obj["iterations"], 3);
        assert!(obj.contains_key("cooldown_s"));
        assert!(obj.contains_key("timeout_s"));
    }
}
