//! Platform Metadata Collection
//!
//! Collects the host information stored alongside every run record: OS and
//! architecture, hostname, and on Linux an `lscpu` pass for core topology
//! and the CPU model name. Everything degrades gracefully when a source is
//! unavailable.
//!
//! The hyper-threading flag is a best-effort heuristic (logical CPU count
//! greater than cores per socket); it misclassifies multi-socket machines
//! without hyper-threading and is recorded as informational only.

use regex::Regex;
use sevenbench_report::PlatformInfo;
use std::process::Command;

/// Collect platform metadata for the current host.
pub fn collect_platform_info() -> PlatformInfo {
    let mut info = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        hostname: hostname(),
        ..Default::default()
    };

    if let Some(lscpu) = command_stdout("lscpu", &[]) {
        info.logical_cpus = capture_u32(&lscpu, r"CPU\(s\):\s*(\d+)");
        info.threads_per_core = capture_u32(&lscpu, r"Thread\(s\) per core:\s*(\d+)");
        info.cores_per_socket = capture_u32(&lscpu, r"Core\(s\) per socket:\s*(\d+)");
        info.model_name = capture_string(&lscpu, r"Model name:\s*(.+)");
        if let (Some(logical), Some(physical)) = (info.logical_cpus, info.cores_per_socket) {
            info.hyper_threading = Some(logical > physical);
        }
    }

    info
}

fn hostname() -> String {
    command_stdout("hostname", &[])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
}

fn capture_u32(text: &str, pattern: &str) -> Option<u32> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture_string(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    Some(re.captures(text)?.get(1)?.as_str().trim().to_string())
}
