//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which translates [`ConversionOptions`](crate::options::ConversionOptions)
//! into a plan) and the [`backend`](super::backend) (which does the actual
//! pixel work). This separation allows swapping backends (e.g. for testing
//! with a mock) without changing translation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Sharpening`]: Unsharp-mask parameters (sigma + threshold).
//! - [`SourceRef`]: Path to read plus an optional frame index (GIF frame 0).
//! - [`Resize`]: Sizing policy: cover crop, max height, max width.
//! - [`Placement`] / [`Anchor`]: Where a watermark goes.
//! - [`ConvertParams`]: Full specification of a static image conversion.
//! - [`AnimatedGifParams`]: Full specification of an animated GIF conversion.

use crate::options::PostOp;
use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening, used when `sharpen` is given without a value.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// A file to decode, optionally restricted to a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub path: PathBuf,
    /// Frame index for multi-frame sources. `None` reads the default image.
    pub frame: Option<u32>,
}

impl SourceRef {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            frame: None,
        }
    }

    pub fn frame(path: &Path, index: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            frame: Some(index),
        }
    }
}

/// Sizing policy. Absence of a `Resize` means "keep the source size".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Scale to cover `width`×`height`, then center-crop to exactly that size.
    Cover { width: u32, height: u32 },
    /// Scale down so the height is at most the bound. Never upscales.
    MaxHeight(u32),
    /// Scale down so the width is at most the bound. Never upscales.
    MaxWidth(u32),
}

impl Resize {
    pub fn is_crop(&self) -> bool {
        matches!(self, Resize::Cover { .. })
    }
}

/// Compass anchor for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Overlay placement: a single anchored copy or a tiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Anchored(Anchor),
    Tiled,
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Anchored(Anchor::BottomRight)
    }
}

/// A watermark image and where to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub file: PathBuf,
    pub placement: Placement,
}

/// Parameters for a static image conversion.
///
/// Steps run in field order: decode `source`, auto-orient, draw `overlay`,
/// apply `resize`, apply `post` ops, encode to `output` as `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: SourceRef,
    pub output: PathBuf,
    pub overlay: Option<Overlay>,
    pub resize: Option<Resize>,
    pub post: Vec<PostOp>,
    pub quality: Quality,
    /// Explicit output format name (`"png"`, `"jpg"`...). `None` infers
    /// it from the output extension.
    pub format: Option<String>,
}

/// Parameters for an animated GIF conversion. Every frame is resized with
/// the same policy; delays and looping are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedGifParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub resize: Option<Resize>,
}
