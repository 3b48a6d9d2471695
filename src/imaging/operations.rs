//! High-level image operations.
//!
//! These functions translate [`ConversionOptions`] into backend parameters
//! and call the backend. Planning is pure, so the translation rules are
//! unit-testable without touching pixels.

use super::backend::{BackendError, ImageBackend};
use super::params::{
    AnimatedGifParams, Anchor, ConvertParams, Overlay, Placement, Quality, Resize, SourceRef,
};
use crate::options::ConversionOptions;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Watermark position names and where they put the overlay.
///
/// Names are case-sensitive. Anything not listed falls back to
/// [`Placement::default`] (bottom-right).
pub const WATERMARK_POSITIONS: &[(&str, Placement)] = &[
    ("NorthWest", Placement::Anchored(Anchor::TopLeft)),
    ("North", Placement::Anchored(Anchor::TopCenter)),
    ("NorthEast", Placement::Anchored(Anchor::TopRight)),
    ("West", Placement::Anchored(Anchor::CenterLeft)),
    ("East", Placement::Anchored(Anchor::CenterRight)),
    ("SouthWest", Placement::Anchored(Anchor::BottomLeft)),
    ("South", Placement::Anchored(Anchor::BottomCenter)),
    ("SouthEast", Placement::Anchored(Anchor::BottomRight)),
    ("Repeat", Placement::Tiled),
];

/// Whether a path names a GIF file (`.gif`, any case).
pub fn is_gif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"))
}

/// Look up a watermark position name.
pub fn placement_for(position: Option<&str>) -> Placement {
    position
        .and_then(|name| {
            WATERMARK_POSITIONS
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|(_, placement)| *placement)
        })
        .unwrap_or_default()
}

/// Pick the sizing policy from width/height. Zero counts as unset.
///
/// Priority: both → cover crop, height only → max height, width only → max width.
pub fn resize_policy(options: &ConversionOptions) -> Option<Resize> {
    let width = options.width.filter(|&w| w > 0);
    let height = options.height.filter(|&h| h > 0);
    match (width, height) {
        (Some(width), Some(height)) => Some(Resize::Cover { width, height }),
        (None, Some(height)) => Some(Resize::MaxHeight(height)),
        (Some(width), None) => Some(Resize::MaxWidth(width)),
        (None, None) => None,
    }
}

/// What the image engine should run for one job.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePlan {
    Static(ConvertParams),
    Animated(AnimatedGifParams),
}

/// Translate options into an engine plan without executing it.
///
/// `default_quality` applies when `options.quality` is unset.
pub fn plan_image(
    source: &Path,
    target: &Path,
    options: &ConversionOptions,
    default_quality: Quality,
) -> ImagePlan {
    let resize = resize_policy(options);

    let source = if is_gif(source) {
        if options.animated {
            return ImagePlan::Animated(AnimatedGifParams {
                source: source.to_path_buf(),
                output: target.to_path_buf(),
                resize,
            });
        }
        SourceRef::frame(source, 0)
    } else {
        SourceRef::new(source)
    };

    // Cropping wins over watermarking
    let overlay = match (&options.watermark, resize) {
        (Some(_), Some(r)) if r.is_crop() => None,
        (Some(watermark), _) => Some(Overlay {
            file: watermark.file.clone(),
            placement: placement_for(watermark.position.as_deref()),
        }),
        (None, _) => None,
    };

    ImagePlan::Static(ConvertParams {
        source,
        output: target.to_path_buf(),
        overlay,
        resize,
        post: options.args.clone(),
        quality: options.quality.map(Quality::new).unwrap_or(default_quality),
        format: options.format.clone(),
    })
}

/// Execute a plan on a backend.
pub fn run_plan(backend: &impl ImageBackend, plan: &ImagePlan) -> Result<()> {
    match plan {
        ImagePlan::Static(params) => backend.convert(params),
        ImagePlan::Animated(params) => backend.animated_gif(params),
    }
}
