//! Engine configuration module.
//!
//! Handles loading and validating `pix.toml`. Every key is optional; a
//! missing file means stock defaults.
//!
//! ## Config File Location
//!
//! `pix` looks for `pix.toml` in the working directory, or takes an explicit
//! path via `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [limits]
//! max_image_size = 8192     # Longest edge an upscale may produce (4096-32768)
//! max_memory_mb = 0         # Refuse larger operations; 0 = unlimited
//! warn_memory_mb = 500      # Log a warning above this estimate
//!
//! [processing]
//! max_threads = 4           # Lanczos worker threads (omit for auto = CPU cores)
//!
//! [batch]
//! scale = 2                 # Default upscale factor (1-8)
//! output_dir = "upscaled"   # Created inside the input folder
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "pix.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `pix.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Size and memory guards for allocating operations.
    pub limits: LimitsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Batch upscale defaults.
    pub batch: BatchConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(LimitsConfig::MIN_IMAGE_SIZE..=LimitsConfig::MAX_IMAGE_SIZE)
            .contains(&self.limits.max_image_size)
        {
            return Err(ConfigError::Validation(format!(
                "limits.max_image_size must be {}-{}",
                LimitsConfig::MIN_IMAGE_SIZE,
                LimitsConfig::MAX_IMAGE_SIZE
            )));
        }
        if !(1..=BatchConfig::MAX_SCALE).contains(&self.batch.scale) {
            return Err(ConfigError::Validation(format!(
                "batch.scale must be 1-{}",
                BatchConfig::MAX_SCALE
            )));
        }
        if self.batch.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "batch.output_dir must not be empty".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1 (omit for auto)".into(),
            ));
        }
        Ok(())
    }
}

/// Size and memory guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Longest edge, in pixels, an upscale is allowed to produce.
    pub max_image_size: u32,
    /// Refuse operations whose memory estimate exceeds this many MiB.
    /// `0` disables the check.
    pub max_memory_mb: u64,
    /// Log a warning when an estimate exceeds this many MiB.
    pub warn_memory_mb: u64,
}

impl LimitsConfig {
    pub const MIN_IMAGE_SIZE: u32 = 4096;
    pub const MAX_IMAGE_SIZE: u32 = 32768;
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_size: 8192,
            max_memory_mb: 0,
            warn_memory_mb: 500,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of Lanczos worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Batch upscale defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Integer upscale factor applied to both edges.
    pub scale: u32,
    /// Output subdirectory, created inside the input folder.
    pub output_dir: String,
}

impl BatchConfig {
    pub const MAX_SCALE: u32 = 8;
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scale: 2,
            output_dir: "upscaled".to_string(),
        }
    }
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, or from `pix.toml` in `dir` when no
/// file is given.
///
/// An explicit path must exist. A missing `pix.toml` in `dir` is not an
/// error and yields the defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<EngineConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(EngineConfig::default());
            }
            candidate
        }
    };
    let content = fs::read_to_string(&path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `pix.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pix Configuration
# =================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# pix reads ./pix.toml, or the file given with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Longest edge, in pixels, an upscale may produce. Range 4096-32768.
max_image_size = 8192

# Refuse operations whose memory estimate (width * height * 4 * 2 bytes)
# exceeds this many MiB. 0 = unlimited.
max_memory_mb = 0

# Log a warning when an estimate exceeds this many MiB.
warn_memory_mb = 500

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Worker threads for Lanczos resampling. Omit for auto (= CPU cores).
# Values above the core count are clamped down.
# max_threads = 4

# ---------------------------------------------------------------------------
# Batch upscale
# ---------------------------------------------------------------------------
[batch]
# Integer factor applied to width and height. Range 1-8.
scale = 2

# Output subdirectory, created inside the input folder.
output_dir = "upscaled"
"##
}
