//! Configuration loading from sevenbench.toml
//!
//! Optional file-based defaults, discovered by walking up from the current
//! directory. Precedence for the iteration count follows the original
//! wrapper convention: CLI flag, then `ITERATIONS`/`DEFAULT_ITERATIONS`
//! environment variables, then the config file, then 1.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name discovered in the working directory or any ancestor.
pub const CONFIG_FILE_NAME: &str = "sevenbench.toml";

/// Optional defaults loaded from `sevenbench.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Default iteration count when neither CLI nor environment supply one
    #[serde(default)]
    pub default_iterations: Option<u32>,
    /// Default cooldown between iterations, seconds
    #[serde(default)]
    pub cooldown: Option<f64>,
    /// Default output directory
    #[serde(default)]
    pub outdir: Option<String>,
    /// Benchmark tool to invoke instead of `7z`
    #[serde(default)]
    pub tool: Option<String>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current
    /// directory; `None` when no file is found or it fails to parse.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }
}

/// Resolve the iteration count: CLI flag > environment > config file > 1.
pub fn resolve_iterations(cli_value: Option<u32>, config: &FileConfig) -> u32 {
    if let Some(value) = cli_value {
        return value;
    }
    for var in ["ITERATIONS", "DEFAULT_ITERATIONS"] {
        if let Some(value) = std::env::var(var).ok().and_then(|v| v.parse().ok()) {
            return value;
        }
    }
    config.default_iterations.unwrap_or(1)
}
