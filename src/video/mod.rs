//! Video processing through ffmpeg.
//!
//! - **Args**: option-to-argument translation for transcodes and frame grabs
//! - **Engine**: [`VideoEngine`] trait + [`FfmpegEngine`]
//! - **Progress**: stderr parsing and percentage sanitizing

pub mod args;
pub mod engine;
pub mod progress;

pub use args::{VideoFormat, extract_frame, is_mts, prepare};
pub use engine::{EngineError, FfmpegEngine, VideoEngine};
pub use progress::{ProgressParser, ProgressTracker};
