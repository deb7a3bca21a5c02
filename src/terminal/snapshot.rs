//! Snapshot requests and their defaulting rules.

use crate::output::{OutputSanitizer, StripMode};

use super::buffer::ScreenBuffer;

/// Lines returned when a request doesn't say, or says something unusable.
pub const DEFAULT_SNAPSHOT_LINES: usize = 20;

/// What a caller wants back from the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRequest {
    /// How many of the most recent lines to return.
    pub count: usize,
    /// Run each line through the sanitizer.
    pub strip_ansi: bool,
    /// Also drop URL schemes when stripping.
    pub plain: bool,
}

impl Default for SnapshotRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_SNAPSHOT_LINES,
            strip_ansi: false,
            plain: false,
        }
    }
}

impl SnapshotRequest {
    pub fn new(count: i64) -> Self {
        Self {
            count: positive_or_default(count),
            ..Self::default()
        }
    }

    pub fn stripped(mut self, strip: bool) -> Self {
        self.strip_ansi = strip;
        self
    }

    pub fn plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    /// Build a request from loosely typed query values.
    ///
    /// `count` is read like a leading integer (`"12abc"` is 12); anything
    /// without one, or that is zero or negative, falls back to the default.
    /// Flags accept `true`, `1`, `yes` and `on`, case-insensitively.
    pub fn from_query(count: Option<&str>, strip: Option<&str>, plain: Option<&str>) -> Self {
        Self {
            count: count
                .and_then(leading_integer)
                .map(positive_or_default)
                .unwrap_or(DEFAULT_SNAPSHOT_LINES),
            strip_ansi: strip.is_some_and(is_truthy),
            plain: plain.is_some_and(is_truthy),
        }
    }

    fn mode(&self) -> StripMode {
        if self.plain {
            StripMode::Plain
        } else {
            StripMode::Ansi
        }
    }

    /// Read the tail of `screen` as this request describes.
    pub fn render(&self, screen: &ScreenBuffer) -> Vec<String> {
        let lines = screen.tail(self.count);
        if !self.strip_ansi {
            return lines;
        }

        let mode = self.mode();
        lines
            .iter()
            .filter_map(|line| OutputSanitizer::strip_optional(Some(line), mode))
            .map(|line| line.trim().to_string())
            .collect()
    }
}

fn positive_or_default(count: i64) -> usize {
    if count > 0 {
        usize::try_from(count).unwrap_or(usize::MAX)
    } else {
        DEFAULT_SNAPSHOT_LINES
    }
}

/// Optional whitespace, optional sign, then digits. Saturates on overflow.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = digits[..len].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -value } else { value })
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
