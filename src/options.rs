//! Declarative conversion options.
//!
//! A single [`ConversionOptions`] value drives all three entry points. Every
//! field is optional; absence means "engine default". Options deserialize from
//! JSON or TOML with unknown keys rejected:
//!
//! ```json
//! {
//!   "width": 800,
//!   "watermark": { "file": "logo.png", "position": "SouthEast" },
//!   "quality": 80,
//!   "args": [{ "sharpen": { "sigma": 0.5, "threshold": 0 } }, "grayscale"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("invalid post-processing directive '{input}': {reason}")]
    InvalidDirective { input: String, reason: String },
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options shared by image, video and still conversions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionOptions {
    /// Target width in pixels.
    pub width: Option<u32>,
    /// Target height in pixels.
    pub height: Option<u32>,
    /// Keep every frame of a GIF source (GIF sources only).
    pub animated: bool,
    pub watermark: Option<Watermark>,
    /// Compression quality (0-100). Images default to 90; image encoders
    /// accept 1-100, so 0 is raised to 1. For mp4/webm video it maps onto
    /// the codec's CRF scale, where 0 means best.
    pub quality: Option<u32>,
    /// Output container or image format (`mp4`, `webm`, `png`...).
    pub format: Option<String>,
    /// Target video bitrate, e.g. `"100k"`.
    pub bitrate: Option<String>,
    /// Post-processing directives applied after sizing and watermarking.
    pub args: Vec<PostOp>,
}

impl ConversionOptions {
    /// Parse a JSON object into options.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Watermark overlay. `position` is a compass name (`NorthWest` ...
/// `SouthEast`) or `Repeat`; anything else means `SouthEast`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Watermark {
    pub file: PathBuf,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// A post-processing directive.
///
/// From the command line these are written as `name` or `name=value`:
///
/// | Directive | Effect |
/// |---|---|
/// | `sharpen`, `sharpen=0.8`, `sharpen=0.8,2` | unsharp mask (sigma, threshold) |
/// | `blur=1.5` | gaussian blur |
/// | `brighten=10` | add to every channel (negative darkens) |
/// | `contrast=12.5` | contrast adjustment in percent |
/// | `grayscale` | drop color |
/// | `invert` | invert colors |
/// | `rotate=90` | rotate clockwise by 90, 180 or 270 |
/// | `flip=h`, `flip=v` | mirror horizontally / vertically |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOp {
    Sharpen { sigma: f32, threshold: i32 },
    Blur { sigma: f32 },
    Brighten(i32),
    Contrast(f32),
    Grayscale,
    Invert,
    Rotate(u32),
    Flip(FlipAxis),
}

fn invalid(input: &str, reason: impl Into<String>) -> OptionsError {
    OptionsError::InvalidDirective {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn number<T: FromStr>(input: &str, value: Option<&str>) -> Result<T, OptionsError> {
    let value = value.ok_or_else(|| invalid(input, "missing value"))?;
    value
        .trim()
        .parse()
        .map_err(|_| invalid(input, format!("'{value}' is not a number")))
}

impl FromStr for PostOp {
    type Err = OptionsError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, value) = match input.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (input.trim(), None),
        };

        match name {
            "sharpen" => {
                let Some(value) = value else {
                    let light = crate::imaging::Sharpening::light();
                    return Ok(PostOp::Sharpen {
                        sigma: light.sigma,
                        threshold: light.threshold,
                    });
                };
                let (sigma, threshold) = match value.split_once(',') {
                    Some((s, t)) => (s, Some(t)),
                    None => (value, None),
                };
                Ok(PostOp::Sharpen {
                    sigma: number(input, Some(sigma))?,
                    threshold: threshold
                        .map(|t| number(input, Some(t)))
                        .transpose()?
                        .unwrap_or(0),
                })
            }
            "blur" => Ok(PostOp::Blur {
                sigma: number(input, value)?,
            }),
            "brighten" => Ok(PostOp::Brighten(number(input, value)?)),
            "contrast" => Ok(PostOp::Contrast(number(input, value)?)),
            "grayscale" => Ok(PostOp::Grayscale),
            "invert" => Ok(PostOp::Invert),
            "rotate" => match number::<u32>(input, value)? {
                degrees @ (90 | 180 | 270) => Ok(PostOp::Rotate(degrees)),
                _ => Err(invalid(input, "rotation must be 90, 180 or 270")),
            },
            "flip" => match value.map(str::trim) {
                Some("h" | "horizontal") => Ok(PostOp::Flip(FlipAxis::Horizontal)),
                Some("v" | "vertical") => Ok(PostOp::Flip(FlipAxis::Vertical)),
                _ => Err(invalid(input, "flip takes 'h' or 'v'")),
            },
            other => Err(invalid(input, format!("unknown directive '{other}'"))),
        }
    }
}
