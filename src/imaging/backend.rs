//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: convert (static images) and animated_gif.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust with no
//! external tools. Everything is statically linked into the binary.

use super::params::{AnimatedGifParams, ConvertParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// The argument translator in [`operations`](super::operations) only talks
/// to this trait, so the rest of the codebase is backend-agnostic.
pub trait ImageBackend: Sync {
    /// Execute a static conversion: orient, overlay, resize, post-process, encode.
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;

    /// Re-encode an animated GIF, resizing every frame.
    fn animated_gif(&self, params: &AnimatedGifParams) -> Result<(), BackendError>;
}
