//! Converter configuration.
//!
//! Handles loading, validating, and merging a `downsize.toml` file. User
//! values are layered over stock defaults, so a config file only needs the
//! keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! quality = 90              # Quality when the job doesn't set one (0-100)
//!
//! [video]
//! # ffmpeg = "/opt/ffmpeg/bin/ffmpeg"  # Omit to search PATH
//! frame_rate = 25           # Output frame rate
//! bitrate = "1200k"         # Video bitrate when no quality/bitrate is given
//! format = "mp4"            # Output container when the job doesn't set one
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Converter configuration loaded from `downsize.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Image defaults.
    pub images: ImagesConfig,
    /// ffmpeg location and transcoding defaults.
    pub video: VideoConfig,
}

impl ConvertConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 0-100".into(),
            ));
        }
        if self.video.frame_rate == 0 {
            return Err(ConfigError::Validation(
                "video.frame_rate must be non-zero".into(),
            ));
        }
        if self.video.bitrate.trim().is_empty() {
            return Err(ConfigError::Validation(
                "video.bitrate must not be empty".into(),
            ));
        }
        if self.video.format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "video.format must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Image defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Compression quality used when a job doesn't specify one.
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

/// ffmpeg location and transcoding defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Explicit ffmpeg binary. `None` searches `PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<PathBuf>,
    /// Output frame rate.
    pub frame_rate: u32,
    /// Video bitrate used when a job sets neither bitrate nor quality.
    pub bitrate: String,
    /// Output container used when a job doesn't set `format`.
    pub format: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg: None,
            frame_rate: 25,
            bitrate: "1200k".to_string(),
            format: "mp4".to_string(),
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ConvertConfig::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ConvertConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ConvertConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, falling back to stock defaults when the
/// file doesn't exist.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<ConvertConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `downsize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# downsize configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Per-job options (width, height, quality, format, bitrate...) are passed on
# the command line; this file only holds the defaults they fall back to.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# Compression quality when a job doesn't set one (0 = worst, 100 = best).
# Honoured by the JPEG and AVIF encoders.
quality = 90

# ---------------------------------------------------------------------------
# Video
# ---------------------------------------------------------------------------
[video]
# Path to the ffmpeg binary. Omit to search PATH.
# ffmpeg = "/usr/local/bin/ffmpeg"

# Output frame rate.
frame_rate = 25

# Video bitrate when a job sets neither bitrate nor quality.
# (.mts sources use a fixed quality scale instead.)
bitrate = "1200k"

# Output container when a job doesn't set one: "mp4", "webm", or any
# ffmpeg muxer name.
format = "mp4"
"##
}
