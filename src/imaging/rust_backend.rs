//! Pure Rust image processing backend, no external tools.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF) | `image` crate (pure Rust decoders) |
//! | Single GIF frame | `image::codecs::gif::GifDecoder::into_frames` |
//! | Auto-orient | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Watermark | `image::imageops::overlay` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Cover crop | fill dimensions + `DynamicImage::crop_imm` |
//! | Post-processing | `unsharpen`, `blur`, `brighten`, `adjust_contrast`, ... |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → GIF (animated) | `image::codecs::gif::GifEncoder`, delays kept, infinite loop |

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    calculate_anchor_offset, calculate_crop_offset, calculate_fill_dimensions,
    calculate_output_dimensions, calculate_tile_offsets,
};
use super::params::{AnimatedGifParams, ConvertParams, Overlay, Placement, Resize, SourceRef};
use crate::options::{FlipAxis, PostOp};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage, Frame, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(action: &str, path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Load and decode an image from disk, applying its EXIF orientation.
///
/// A frame index forces a GIF decode of that single frame.
fn load_image(source: &SourceRef) -> Result<DynamicImage, BackendError> {
    if let Some(index) = source.frame {
        return load_gif_frame(&source.path, index);
    }

    let mut decoder = ImageReader::open(&source.path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| failed("decode", &source.path, e))?;
    let orientation = decoder
        .orientation()
        .map_err(|e| failed("read orientation of", &source.path, e))?;
    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| failed("decode", &source.path, e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

fn load_gif_frame(path: &Path, index: u32) -> Result<DynamicImage, BackendError> {
    let decoder = GifDecoder::new(BufReader::new(File::open(path)?))
        .map_err(|e| failed("decode", path, e))?;
    let frame = decoder
        .into_frames()
        .nth(index as usize)
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("{} has no frame {}", path.display(), index))
        })?
        .map_err(|e| failed("decode", path, e))?;
    Ok(DynamicImage::ImageRgba8(frame.into_buffer()))
}

fn apply_overlay(img: &mut DynamicImage, overlay: &Overlay) -> Result<(), BackendError> {
    let mark = load_image(&SourceRef::new(&overlay.file))?;
    let base = (img.width(), img.height());
    let size = (mark.width(), mark.height());

    let offsets = match overlay.placement {
        Placement::Anchored(anchor) => vec![calculate_anchor_offset(base, size, anchor)],
        Placement::Tiled => calculate_tile_offsets(base, size),
    };
    for (x, y) in offsets {
        image::imageops::overlay(img, &mark, x, y);
    }
    Ok(())
}

fn apply_resize(img: DynamicImage, resize: Option<Resize>) -> DynamicImage {
    let source = (img.width(), img.height());
    match resize {
        None => img,
        Some(Resize::Cover { width, height }) => {
            // Fill-resize then center-crop to exact dimensions
            let filled = calculate_fill_dimensions(source, (width, height));
            let (x, y) = calculate_crop_offset(filled, (width, height));
            img.resize_exact(filled.0, filled.1, FilterType::Lanczos3)
                .crop_imm(x, y, width, height)
        }
        Some(bound) => {
            let (w, h) = calculate_output_dimensions(source, Some(bound));
            if (w, h) == source {
                img
            } else {
                img.resize_exact(w, h, FilterType::Lanczos3)
            }
        }
    }
}

fn apply_post(mut img: DynamicImage, ops: &[PostOp]) -> Result<DynamicImage, BackendError> {
    for op in ops {
        img = match op {
            PostOp::Sharpen { sigma, threshold } => img.unsharpen(*sigma, *threshold),
            PostOp::Blur { sigma } => img.blur(*sigma),
            PostOp::Brighten(value) => img.brighten(*value),
            PostOp::Contrast(value) => img.adjust_contrast(*value),
            PostOp::Grayscale => img.grayscale(),
            PostOp::Invert => {
                img.invert();
                img
            }
            PostOp::Rotate(90) => img.rotate90(),
            PostOp::Rotate(180) => img.rotate180(),
            PostOp::Rotate(270) => img.rotate270(),
            PostOp::Rotate(other) => {
                return Err(BackendError::ProcessingFailed(format!(
                    "Unsupported rotation: {other} degrees"
                )));
            }
            PostOp::Flip(FlipAxis::Horizontal) => img.fliph(),
            PostOp::Flip(FlipAxis::Vertical) => img.flipv(),
        };
    }
    Ok(img)
}

/// Resolve the encoder for an explicit format name or the output extension.
fn output_format(output: &Path, format: Option<&str>) -> Result<ImageFormat, BackendError> {
    let name = match format {
        Some(name) => name,
        None => output.extension().and_then(|e| e.to_str()).unwrap_or(""),
    };
    ImageFormat::from_extension(name)
        .filter(|f| f.writing_enabled())
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Unsupported output format: {}", name))
        })
}

/// Save a DynamicImage to the given path in the given format.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: u32,
) -> Result<(), BackendError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        ImageFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality as u8);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        ImageFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut writer,
                6,
                quality as u8,
            );
            DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut writer);
            encoder.encode_frame(Frame::new(img.to_rgba8()))
        }
        other => img.write_to(&mut writer, other),
    };
    result.map_err(|e| failed("write", path, e))
}

impl ImageBackend for RustBackend {
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        let format = output_format(&params.output, params.format.as_deref())?;
        let mut img = load_image(&params.source)?;

        if let Some(overlay) = &params.overlay {
            apply_overlay(&mut img, overlay)?;
        }
        let img = apply_resize(img, params.resize);
        let img = apply_post(img, &params.post)?;

        save_image(&img, &params.output, format, params.quality.value())
    }

    fn animated_gif(&self, params: &AnimatedGifParams) -> Result<(), BackendError> {
        let decoder = GifDecoder::new(BufReader::new(File::open(&params.source)?))
            .map_err(|e| failed("decode", &params.source, e))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| failed("decode", &params.source, e))?;

        let file = File::create(&params.output)?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| failed("write", &params.output, e))?;

        for frame in frames {
            let delay = frame.delay();
            let resized = apply_resize(DynamicImage::ImageRgba8(frame.into_buffer()), params.resize);
            encoder
                .encode_frame(Frame::from_parts(resized.to_rgba8(), 0, 0, delay))
                .map_err(|e| failed("write", &params.output, e))?;
        }
        Ok(())
    }
}
