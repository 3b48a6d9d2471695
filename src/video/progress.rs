//! Progress from ffmpeg's stderr.
//!
//! ffmpeg prints the input duration once (`Duration: 00:01:02.50, ...`) and
//! then status lines carrying the current position (`... time=00:00:12.34
//! bitrate=...`). [`ProgressParser`] turns those into raw percentages and
//! [`ProgressTracker`] turns raw percentages into a clean, strictly
//! increasing sequence of whole percents.

/// Parse an `HH:MM:SS(.frac)` timestamp into seconds.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.starts_with('-') {
        return None;
    }
    let mut parts = text.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Value following `key` up to the next separator.
fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = line[start..].trim_start();
    let end = rest
        .find(|c: char| c == ',' || c.is_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Stateful stderr line parser.
#[derive(Debug, Default)]
pub struct ProgressParser {
    duration: Option<f64>,
}

impl ProgressParser {
    /// Feed one stderr line. Returns a raw percentage when the line reports
    /// a position and the duration is known.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        if self.duration.is_none() {
            if let Some(duration) = field(line, "Duration:").and_then(parse_timestamp) {
                if duration > 0.0 {
                    self.duration = Some(duration);
                }
                return None;
            }
        }
        let duration = self.duration?;
        let position = field(line, "time=").and_then(parse_timestamp)?;
        Some(position / duration * 100.0)
    }
}

/// Sanitizes raw percentages: clamps to 0-100, truncates to whole
/// percents and drops anything not above the last emitted value.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn observe(&mut self, raw: f64) -> Option<u8> {
        if !raw.is_finite() {
            return None;
        }
        let percent = raw.clamp(0.0, 100.0).floor() as u8;
        match self.last {
            Some(last) if percent <= last => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }
}
