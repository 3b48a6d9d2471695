//! Video engine: the `ffmpeg` command-line tool.
//!
//! [`VideoEngine`] is the seam the converter talks to; [`FfmpegEngine`]
//! spawns ffmpeg, streams its stderr through the progress parser and keeps
//! the last lines around for error messages.

use super::progress::ProgressParser;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, trace};

/// Number of stderr lines kept for failure messages.
const STDERR_TAIL: usize = 20;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {}: {stderr}", exit_label(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// Something that runs an ordered ffmpeg-style argument list.
///
/// `on_progress` receives raw percentages as the engine reports them; they
/// may repeat or go backwards, callers sanitize.
pub trait VideoEngine: Sync {
    fn execute(&self, args: &[String], on_progress: &mut dyn FnMut(f64))
    -> Result<(), EngineError>;
}

/// Runs the real `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    program: PathBuf,
}

impl FfmpegEngine {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Use the configured path, or search `PATH` when none is configured.
    ///
    /// A configured path that doesn't exist is an error naming that path.
    pub fn locate(configured: Option<&Path>) -> Result<Self, EngineError> {
        if let Some(path) = configured {
            if path.exists() {
                return Ok(Self::new(path.to_path_buf()));
            }
            return Err(EngineError::ToolNotFound {
                tool: path.display().to_string(),
            });
        }
        which::which("ffmpeg")
            .map(Self::new)
            .map_err(|_| EngineError::ToolNotFound {
                tool: "ffmpeg".to_string(),
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// First line of `ffmpeg -version`, or `None` when it cannot run.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.program).arg("-version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|s| s.to_string())
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

/// Read ffmpeg's stderr to the end, reporting progress as it goes.
///
/// Returns the last [`STDERR_TAIL`] lines and the read error that stopped
/// draining, if any. Never returns early so the caller can always reap.
fn drain_stderr(
    stderr: impl Read,
    on_progress: &mut dyn FnMut(f64),
) -> (VecDeque<String>, Option<std::io::Error>) {
    let mut parser = ProgressParser::default();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL);

    // Status lines end in '\r', everything else in '\n'
    for chunk in BufReader::new(stderr).split(b'\r') {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => return (tail, Some(err)),
        };
        for line in String::from_utf8_lossy(&chunk).lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            trace!(line, "ffmpeg");
            if let Some(percent) = parser.feed(line) {
                on_progress(percent);
            }
            if tail.len() == STDERR_TAIL {
                tail.pop_front();
            }
            tail.push_back(line.to_string());
        }
    }
    (tail, None)
}

impl VideoEngine for FfmpegEngine {
    fn execute(
        &self,
        args: &[String],
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), EngineError> {
        debug!(program = %self.program.display(), ?args, "running ffmpeg");

        let mut child = Command::new(&self.program)
            .arg("-hide_banner")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                tool: self.tool_name(),
                source,
            })?;

        let (tail, read_error) = match child.stderr.take() {
            Some(stderr) => drain_stderr(stderr, on_progress),
            None => (VecDeque::new(), None),
        };

        // Reap the child before reporting a read failure
        let status = child.wait()?;
        if let Some(err) = read_error {
            return Err(EngineError::Io(err));
        }
        if !status.success() {
            return Err(EngineError::Failed {
                tool: self.tool_name(),
                code: status.code(),
                stderr: Vec::from(tail).join("\n"),
            });
        }
        Ok(())
    }
}
