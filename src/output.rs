//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Video / still jobs
//!
//! ```text
//! clip.mts → out/clip.mp4
//!     [#####---------------]  25%
//!     [##########----------]  50%
//!     offset frame missing, retrying at first frame
//! Done: out/clip.mp4
//! ```
//!
//! ## Tools
//!
//! ```text
//! ffmpeg: /usr/bin/ffmpeg
//!     ffmpeg version 6.1.1
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::convert::JobEvent;
use std::path::Path;

/// Width of the progress bar in characters.
const BAR_WIDTH: usize = 20;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Last path component, or the whole path when there is none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render a fixed-width progress bar.
///
/// ```text
/// [#####---------------]  25%
/// ```
pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// Format a single job event as display lines.
pub fn format_job_event(event: &JobEvent) -> Vec<String> {
    match event {
        JobEvent::Started { source, target } => {
            vec![format!("{} → {}", display_name(source), target.display())]
        }
        JobEvent::Progress(percent) => {
            vec![format!("{}{}", indent(1), progress_bar(*percent))]
        }
        JobEvent::FrameFallback => vec![format!(
            "{}offset frame missing, retrying at first frame",
            indent(1)
        )],
    }
}

/// Final line after a job succeeded.
pub fn format_done(target: &Path) -> String {
    format!("Done: {}", target.display())
}

pub fn print_done(target: &Path) {
    println!("{}", format_done(target));
}

/// Format the external tool report: resolved path plus version line.
pub fn format_tool_status(
    tool: &str,
    location: Option<&Path>,
    version: Option<&str>,
) -> Vec<String> {
    match location {
        Some(path) => {
            let mut lines = vec![format!("{}: {}", tool, path.display())];
            if let Some(version) = version {
                lines.push(format!("{}{}", indent(1), version));
            }
            lines
        }
        None => vec![format!("{}: not found", tool)],
    }
}

pub fn print_tool_status(tool: &str, location: Option<&Path>, version: Option<&str>) {
    for line in format_tool_status(tool, location, version) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn progress_bar_empty() {
        assert_eq!(progress_bar(0), "[--------------------]   0%");
    }

    #[test]
    fn progress_bar_partial() {
        assert_eq!(progress_bar(25), "[#####---------------]  25%");
    }

    #[test]
    fn progress_bar_full() {
        assert_eq!(progress_bar(100), "[####################] 100%");
    }

    #[test]
    fn progress_bar_clamps_overflow() {
        assert_eq!(progress_bar(250), progress_bar(100));
    }

    #[test]
    fn started_event_shows_source_name_and_target() {
        let lines = format_job_event(&JobEvent::Started {
            source: PathBuf::from("/videos/in/clip.mts"),
            target: PathBuf::from("out/clip.mp4"),
        });
        assert_eq!(lines, vec!["clip.mts → out/clip.mp4"]);
    }

    #[test]
    fn progress_event_is_indented_bar() {
        let lines = format_job_event(&JobEvent::Progress(50));
        assert_eq!(lines, vec!["    [##########----------]  50%"]);
    }

    #[test]
    fn fallback_event_is_indented() {
        let lines = format_job_event(&JobEvent::FrameFallback);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("    "));
        assert!(lines[0].contains("first frame"));
    }

    #[test]
    fn done_line() {
        assert_eq!(format_done(Path::new("out/a.jpg")), "Done: out/a.jpg");
    }

    #[test]
    fn tool_status_found_with_version() {
        let lines = format_tool_status(
            "ffmpeg",
            Some(Path::new("/usr/bin/ffmpeg")),
            Some("ffmpeg version 6.1.1"),
        );
        assert_eq!(
            lines,
            vec!["ffmpeg: /usr/bin/ffmpeg", "    ffmpeg version 6.1.1"]
        );
    }

    #[test]
    fn tool_status_missing() {
        assert_eq!(
            format_tool_status("ffmpeg", None, None),
            vec!["ffmpeg: not found"]
        );
    }
}
