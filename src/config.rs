//! Image configuration module.
//!
//! Handles loading, validating, and merging an `imgchain.toml` file. Stock
//! defaults are the base layer; a user file overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [encoding]
//! jpeg_quality = 100          # JPEG quality (1-100)
//! png_compression = "default" # "fast", "default" or "best"
//!
//! [decoding]
//! max_pixels = 100000000      # Refuse larger sources (0 = unlimited)
//!
//! [transform]
//! fit_policy = "sequential"   # "sequential" or "contain"
//!
//! [processing]
//! max_threads = 4             # Resampler threads (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{FitPolicy, PngCompression};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`] when given a directory.
pub const CONFIG_FILE_NAME: &str = "imgchain.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings applied to every handle opened with this configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// Output encoder settings.
    pub encoding: EncodingConfig,
    /// Source decoder limits.
    pub decoding: DecodingConfig,
    /// Transform policy knobs.
    pub transform: TransformConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ImageConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    pub png_compression: PngCompression,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            png_compression: PngCompression::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodingConfig {
    /// Maximum `width * height` of a source image. 0 disables the check.
    pub max_pixels: u64,
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            max_pixels: 100_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    pub fit_policy: FitPolicy,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of threads the resampler spreads rows over.
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
    config.max_threads.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ImageConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// `path` may be the file itself or a directory containing
/// [`CONFIG_FILE_NAME`]. Returns `Ok(None)` if there is no such file.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ImageConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImageConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file or directory, layered over stock defaults.
pub fn load_config(path: &Path) -> Result<ImageConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("resolved config from {}: {config:?}", path.display());
    Ok(config)
}

/// Returns a fully-commented stock `imgchain.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgchain Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality (1 = worst, 100 = best).
jpeg_quality = 100

# PNG compression effort: "fast", "default" or "best".
png_compression = "default"

# ---------------------------------------------------------------------------
# Decoding
# ---------------------------------------------------------------------------
[decoding]
# Refuse to decode sources with more than this many pixels.
# 0 disables the limit.
max_pixels = 100000000

# ---------------------------------------------------------------------------
# Transforms
# ---------------------------------------------------------------------------
[transform]
# How `fit` picks its scale when the image overflows both bounds:
#   "sequential" - the height bound overrides the width bound
#   "contain"    - the smaller ratio wins, so both bounds hold
fit_policy = "sequential"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum threads used by the resampler.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
