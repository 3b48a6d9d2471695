//! # Downsize
//!
//! Media conversion for upload pipelines: resize and re-encode images,
//! transcode videos and pull still frames out of them. Images are handled
//! in-process with the `image` crate; video work is delegated to `ffmpeg`.
//!
//! # Architecture: Translate, Then Execute
//!
//! Every job goes through the same two steps:
//!
//! ```text
//! ConversionOptions ──translate──▶ ConvertParams / ffmpeg args ──execute──▶ target file
//! ```
//!
//! Translation is a pure function of the source path, target path and
//! options, so most behavior is tested without touching pixels or spawning
//! processes. Execution sits behind two traits: [`imaging::ImageBackend`]
//! and [`video::VideoEngine`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`convert`] | The `image`, `video` and `still` entry points, progress events, errors |
//! | [`options`] | Caller-facing option record and post-processing directives |
//! | [`imaging`] | Image plans, dimension math and the pure-Rust backend |
//! | [`video`] | ffmpeg argument lists, the engine trait and progress parsing |
//! | [`config`] | `downsize.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Animated GIFs
//!
//! A GIF source is flattened to its first frame unless the job asks for
//! `animated`, in which case every frame is resized and re-encoded as a GIF.
//! Animated output ignores watermarks and post-processing.
//!
//! ## Still Frames
//!
//! The first grab seeks a tenth of a second in, past the black frame many
//! cameras record first. Clips shorter than that produce no file, so a
//! second grab without the seek follows. The grabbed frame is then run
//! through the image path in place.
//!
//! ## Progress
//!
//! ffmpeg's own progress numbers jitter. Consumers only ever see whole,
//! strictly increasing percentages via [`convert::JobEvent::Progress`].

pub mod config;
pub mod convert;
pub mod imaging;
pub mod options;
pub mod output;
pub mod video;

#[cfg(test)]
pub(crate) mod test_helpers;
