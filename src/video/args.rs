//! ffmpeg argument lists.
//!
//! Everything here is a pure function from options to `Vec<String>`, so the
//! exact command line for any job can be asserted in tests without running
//! ffmpeg.

use crate::config::VideoConfig;
use crate::options::ConversionOptions;
use std::path::Path;

/// Seek offset for still-frame extraction. Skips a black leading frame.
pub const STILL_OFFSET: &str = "0.1";

/// Fixed quality scale for interlaced `.mts` camcorder sources.
pub const MTS_QSCALE: &str = "4";

/// Deinterlacing filter for `.mts` sources.
pub const DEINTERLACE_FILTER: &str = "yadif=1";

/// Output container, which decides codecs and the CRF scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Webm,
    /// Any other muxer name. No codecs are forced.
    Other(String),
}

impl VideoFormat {
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "mp4" => VideoFormat::Mp4,
            "webm" => VideoFormat::Webm,
            other => VideoFormat::Other(other.to_string()),
        }
    }

    /// Muxer name for `-f`.
    pub fn muxer(&self) -> &str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Webm => "webm",
            VideoFormat::Other(name) => name,
        }
    }

    /// Worst CRF value of the format's encoder, if it has one.
    fn crf_max(&self) -> Option<u32> {
        match self {
            VideoFormat::Mp4 => Some(51),
            VideoFormat::Webm => Some(63),
            VideoFormat::Other(_) => None,
        }
    }

    fn codec_args(&self) -> &'static [&'static str] {
        match self {
            VideoFormat::Mp4 => &["-vcodec", "libx264", "-acodec", "aac", "-pix_fmt", "yuv420p"],
            VideoFormat::Webm => &["-vcodec", "libvpx-vp9", "-acodec", "libopus"],
            VideoFormat::Other(_) => &[],
        }
    }
}

/// Whether a path is an AVCHD `.mts` file (any case).
pub fn is_mts(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mts"))
}

/// Map quality 0-100 (higher is better) onto a CRF scale `0..=max` (lower is better).
pub fn quality_to_crf(quality: u32, max: u32) -> u32 {
    let quality = quality.min(100);
    ((100 - quality) * max + 50) / 100
}

/// Scale filter following the image sizing policy: cover crop when both
/// dimensions are set, otherwise a downscale-only bound. Output dimensions
/// stay even, which H.264 requires.
pub fn scale_filter(options: &ConversionOptions) -> Option<String> {
    let width = options.width.filter(|&w| w > 0);
    let height = options.height.filter(|&h| h > 0);
    match (width, height) {
        (Some(w), Some(h)) => Some(format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}"
        )),
        (None, Some(h)) => Some(format!("scale=-2:min({h}\\,ih)")),
        (Some(w), None) => Some(format!("scale=min({w}\\,iw):-2")),
        (None, None) => None,
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build the transcoding argument list.
///
/// Rate control, first match wins: explicit bitrate, explicit quality (as
/// CRF, when the format has a CRF scale), fixed quality scale for `.mts`
/// sources, configured default bitrate.
pub fn prepare(
    source: &Path,
    target: &Path,
    options: &ConversionOptions,
    config: &VideoConfig,
) -> Vec<String> {
    let format = VideoFormat::parse(options.format.as_deref().unwrap_or(&config.format));
    let interlaced = is_mts(source);

    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), path_arg(source)];

    let filters: Vec<String> = interlaced
        .then(|| DEINTERLACE_FILTER.to_string())
        .into_iter()
        .chain(scale_filter(options))
        .collect();
    if !filters.is_empty() {
        args.push("-vf".into());
        args.push(filters.join(","));
    }

    args.push("-r".into());
    args.push(config.frame_rate.to_string());

    args.extend(format.codec_args().iter().map(|s| s.to_string()));

    let crf = options
        .quality
        .zip(format.crf_max())
        .map(|(quality, max)| quality_to_crf(quality, max));

    if let Some(bitrate) = &options.bitrate {
        args.extend(["-b:v".into(), bitrate.clone()]);
    } else if let Some(crf) = crf {
        args.extend(["-crf".into(), crf.to_string()]);
        if format == VideoFormat::Webm {
            // VP9 only runs in constant-quality mode with a zero bitrate
            args.extend(["-b:v".into(), "0".into()]);
        }
    } else if interlaced {
        args.extend(["-q:v".into(), MTS_QSCALE.into()]);
    } else {
        args.extend(["-b:v".into(), config.bitrate.clone()]);
    }

    if format == VideoFormat::Mp4 {
        args.extend(["-movflags".into(), "+faststart".into()]);
    }

    args.extend(["-f".into(), format.muxer().to_string(), path_arg(target)]);
    args
}

/// Build a single-frame extraction. `offset` seeks before decoding.
pub fn extract_frame(source: &Path, target: &Path, offset: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    if let Some(offset) = offset {
        args.extend(["-ss".into(), offset.to_string()]);
    }
    args.extend([
        "-i".into(),
        path_arg(source),
        "-vframes".into(),
        "1".into(),
        "-y".into(),
        path_arg(target),
    ]);
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare_default(source: &str, options: &ConversionOptions) -> Vec<String> {
        prepare(
            Path::new(source),
            Path::new("/out/video.mp4"),
            options,
            &VideoConfig::default(),
        )
    }

    fn contains_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn default_mp4_arguments() {
        let args = prepare_default("/in/clip.mov", &ConversionOptions::default());
        assert_eq!(
            args,
            vec![
                "-y", "-i", "/in/clip.mov", "-r", "25", "-vcodec", "libx264", "-acodec", "aac",
                "-pix_fmt", "yuv420p", "-b:v", "1200k", "-movflags", "+faststart", "-f", "mp4",
                "/out/video.mp4",
            ]
        );
    }

    #[test]
    fn mts_source_is_deinterlaced_with_fixed_qscale() {
        let args = prepare_default("/in/cam.MTS", &ConversionOptions::default());
        assert!(contains_pair(&args, "-vf", "yadif=1"));
        assert!(contains_pair(&args, "-q:v", "4"));
        assert!(!args.iter().any(|a| a == "-b:v"));
    }

    #[test]
    fn explicit_bitrate_wins() {
        let options = ConversionOptions {
            bitrate: Some("100k".to_string()),
            quality: Some(50),
            ..Default::default()
        };
        let args = prepare_default("/in/cam.mts", &options);
        assert!(contains_pair(&args, "-b:v", "100k"));
        assert!(!args.iter().any(|a| a == "-crf" || a == "-q:v"));
        // Still deinterlaced
        assert!(contains_pair(&args, "-vf", "yadif=1"));
    }

    #[test]
    fn quality_maps_to_crf_per_format() {
        let mp4 = prepare_default(
            "/in/a.mp4",
            &ConversionOptions {
                quality: Some(50),
                ..Default::default()
            },
        );
        assert!(contains_pair(&mp4, "-crf", "26"));
        assert!(!mp4.iter().any(|a| a == "-b:v"));

        let webm = prepare_default(
            "/in/a.mp4",
            &ConversionOptions {
                quality: Some(50),
                format: Some("webm".to_string()),
                ..Default::default()
            },
        );
        assert!(contains_pair(&webm, "-crf", "32"));
        assert!(contains_pair(&webm, "-b:v", "0"));
    }

    #[test]
    fn webm_uses_vp9_without_faststart() {
        let args = prepare_default(
            "/in/a.mp4",
            &ConversionOptions {
                format: Some("webm".to_string()),
                ..Default::default()
            },
        );
        assert!(contains_pair(&args, "-vcodec", "libvpx-vp9"));
        assert!(contains_pair(&args, "-acodec", "libopus"));
        assert!(contains_pair(&args, "-f", "webm"));
        assert!(!args.iter().any(|a| a == "-movflags"));
    }

    #[test]
    fn other_formats_pass_through() {
        let args = prepare_default(
            "/in/a.mp4",
            &ConversionOptions {
                format: Some("matroska".to_string()),
                quality: Some(80),
                ..Default::default()
            },
        );
        assert!(contains_pair(&args, "-f", "matroska"));
        assert!(!args.iter().any(|a| a == "-vcodec" || a == "-crf"));
        assert!(contains_pair(&args, "-b:v", "1200k"));
    }

    #[test]
    fn config_controls_defaults() {
        let config = VideoConfig {
            frame_rate: 30,
            bitrate: "800k".to_string(),
            format: "webm".to_string(),
            ..VideoConfig::default()
        };
        let args = prepare(
            Path::new("/a.mp4"),
            Path::new("/b.webm"),
            &ConversionOptions::default(),
            &config,
        );
        assert!(contains_pair(&args, "-r", "30"));
        assert!(contains_pair(&args, "-b:v", "800k"));
        assert!(contains_pair(&args, "-f", "webm"));
    }

    #[test]
    fn scale_filters_follow_sizing_policy() {
        let both = ConversionOptions {
            width: Some(640),
            height: Some(360),
            ..Default::default()
        };
        assert_eq!(
            scale_filter(&both).unwrap(),
            "scale=640:360:force_original_aspect_ratio=increase,crop=640:360"
        );

        let height = ConversionOptions {
            height: Some(360),
            ..Default::default()
        };
        assert_eq!(scale_filter(&height).unwrap(), "scale=-2:min(360\\,ih)");

        let width = ConversionOptions {
            width: Some(640),
            ..Default::default()
        };
        assert_eq!(scale_filter(&width).unwrap(), "scale=min(640\\,iw):-2");

        assert_eq!(scale_filter(&ConversionOptions::default()), None);
    }

    #[test]
    fn deinterlace_runs_before_scaling() {
        let args = prepare_default(
            "/in/cam.mts",
            &ConversionOptions {
                width: Some(640),
                ..Default::default()
            },
        );
        assert!(contains_pair(&args, "-vf", "yadif=1,scale=min(640\\,iw):-2"));
    }

    #[test]
    fn crf_mapping_bounds() {
        assert_eq!(quality_to_crf(100, 51), 0);
        assert_eq!(quality_to_crf(0, 51), 51);
        assert_eq!(quality_to_crf(250, 63), 0);
    }

    #[test]
    fn frame_extraction_with_and_without_offset() {
        let src = Path::new("/in/clip.mp4");
        let dst = Path::new("/out/frame.jpg");
        assert_eq!(
            extract_frame(src, dst, Some(STILL_OFFSET)),
            vec!["-ss", "0.1", "-i", "/in/clip.mp4", "-vframes", "1", "-y", "/out/frame.jpg"]
        );
        assert_eq!(
            extract_frame(src, dst, None),
            vec!["-i", "/in/clip.mp4", "-vframes", "1", "-y", "/out/frame.jpg"]
        );
    }
}
