//! The three entry points: image, video and still.
//!
//! A [`Converter`] pairs an [`ImageBackend`] with a [`VideoEngine`]. Every
//! entry point creates the target's parent directory, translates the
//! options, runs the engine and returns a single `Result`. Video and still
//! jobs additionally report [`JobEvent`]s on an optional channel while they
//! run; the channel is closed when the call returns.
//!
//! ## Still-frame extraction
//!
//! ```text
//! Offset ──(target missing)──▶ Default ──▶ resize
//!    │                                       ▲
//!    └──────────(target exists)──────────────┘
//! ```
//!
//! The first attempt seeks 0.1s in to skip a black leading frame. Existence
//! of the target file is the only success signal; the second attempt's
//! outcome is not checked, the resize step reports any failure.

use crate::config::ConvertConfig;
use crate::imaging::{
    BackendError, ImageBackend, Quality, RustBackend, plan_image, run_plan,
};
use crate::options::ConversionOptions;
use crate::video::args::STILL_OFFSET;
use crate::video::{self, EngineError, FfmpegEngine, ProgressTracker, VideoEngine};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Cannot create directory {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Image processing failed: {0}")]
    Image(#[from] BackendError),
    #[error("Video processing failed: {0}")]
    Video(#[from] EngineError),
}

/// Events reported while a video or still job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Started { source: PathBuf, target: PathBuf },
    /// Whole percent complete, strictly increasing within a job.
    Progress(u8),
    /// The offset frame grab produced nothing; retrying at the first frame.
    FrameFallback,
}

/// Frame-extraction attempts, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAttempt {
    /// Seek [`STILL_OFFSET`] seconds in before grabbing.
    Offset,
    /// Grab the first decodable frame.
    Default,
}

impl FrameAttempt {
    pub fn args(self, source: &Path, target: &Path) -> Vec<String> {
        match self {
            FrameAttempt::Offset => video::extract_frame(source, target, Some(STILL_OFFSET)),
            FrameAttempt::Default => video::extract_frame(source, target, None),
        }
    }

    /// Attempt to run when this one left no file behind.
    pub fn next(self) -> Option<FrameAttempt> {
        match self {
            FrameAttempt::Offset => Some(FrameAttempt::Default),
            FrameAttempt::Default => None,
        }
    }
}

/// Create the parent directory of `target` if needed.
pub fn ensure_parent_dir(target: &Path) -> Result<(), ConvertError> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| ConvertError::Filesystem {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn send(events: Option<&Sender<JobEvent>>, event: JobEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening
        let _ = tx.send(event);
    }
}

/// Runs conversions against an image backend and a video engine.
pub struct Converter<B = RustBackend, V = FfmpegEngine> {
    backend: B,
    engine: V,
    config: ConvertConfig,
}

impl Converter<RustBackend, FfmpegEngine> {
    /// Production converter: pure-Rust images, ffmpeg from config or `PATH`.
    pub fn from_config(config: ConvertConfig) -> Result<Self, ConvertError> {
        let engine = FfmpegEngine::locate(config.video.ffmpeg.as_deref())?;
        Ok(Self::new(RustBackend::new(), engine, config))
    }
}

impl<B: ImageBackend, V: VideoEngine> Converter<B, V> {
    pub fn new(backend: B, engine: V, config: ConvertConfig) -> Self {
        Self {
            backend,
            engine,
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn engine(&self) -> &V {
        &self.engine
    }

    /// Convert and/or resize an image.
    pub fn image(
        &self,
        source: &Path,
        target: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ConvertError> {
        ensure_parent_dir(target)?;

        let plan = plan_image(
            source,
            target,
            options,
            Quality::new(self.config.images.quality),
        );
        debug!(?plan, "image plan");
        run_plan(&self.backend, &plan)?;

        info!(source = %source.display(), target = %target.display(), "image converted");
        Ok(())
    }

    /// Transcode and/or downsample a video, reporting progress on `events`.
    pub fn video(
        &self,
        source: &Path,
        target: &Path,
        options: &ConversionOptions,
        events: Option<Sender<JobEvent>>,
    ) -> Result<(), ConvertError> {
        ensure_parent_dir(target)?;
        send(
            events.as_ref(),
            JobEvent::Started {
                source: source.to_path_buf(),
                target: target.to_path_buf(),
            },
        );

        let args = video::prepare(source, target, options, &self.config.video);
        let mut tracker = ProgressTracker::default();
        self.engine.execute(&args, &mut |raw| {
            if let Some(percent) = tracker.observe(raw) {
                send(events.as_ref(), JobEvent::Progress(percent));
            }
        })?;

        info!(source = %source.display(), target = %target.display(), "video converted");
        Ok(())
    }

    /// Extract a still frame from a video, then resize it like an image.
    pub fn still(
        &self,
        source: &Path,
        target: &Path,
        options: &ConversionOptions,
        events: Option<Sender<JobEvent>>,
    ) -> Result<(), ConvertError> {
        ensure_parent_dir(target)?;
        send(
            events.as_ref(),
            JobEvent::Started {
                source: source.to_path_buf(),
                target: target.to_path_buf(),
            },
        );

        self.extract_frame(source, target, events.as_ref());
        self.image(target, target, options)
    }

    /// Walk the [`FrameAttempt`]s until one leaves a file at `target`.
    fn extract_frame(&self, source: &Path, target: &Path, events: Option<&Sender<JobEvent>>) {
        let mut attempt = Some(FrameAttempt::Offset);
        while let Some(current) = attempt {
            let result = self
                .engine
                .execute(&current.args(source, target), &mut |_| {});
            if target.exists() {
                if let Err(err) = result {
                    warn!(?current, %err, "frame grab reported an error but wrote a file");
                }
                return;
            }
            if let Err(err) = &result {
                warn!(?current, %err, "frame grab failed");
            }
            attempt = current.next();
            if attempt.is_some() {
                send(events, JobEvent::FrameFallback);
            }
        }
    }
}
