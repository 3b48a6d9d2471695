//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Convert** | decode → orient → watermark → resize → post ops → encode |
//! | **Animated GIF** | per-frame resize with `GifDecoder` / `GifEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and placement math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Option-to-parameter translation and plan execution

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::calculate_output_dimensions;
pub use operations::{ImagePlan, is_gif, placement_for, plan_image, resize_policy, run_plan};
pub use params::{
    AnimatedGifParams, Anchor, ConvertParams, Overlay, Placement, Quality, Resize, Sharpening,
    SourceRef,
};
pub use rust_backend::RustBackend;
