//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::terminal::{SnapshotRequest, TerminalStatus};

/// Query for `GET /api/output`.
///
/// Values stay strings so that junk like `lines=abc` falls back to a
/// default instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputQuery {
    /// Number of trailing lines.
    #[serde(default)]
    pub lines: Option<String>,
    /// Strip control sequences and title fragments.
    #[serde(default)]
    pub strip: Option<String>,
    /// When stripping, also drop URL schemes.
    #[serde(default)]
    pub plain: Option<String>,
}

impl OutputQuery {
    pub fn to_request(&self) -> SnapshotRequest {
        SnapshotRequest::from_query(
            self.lines.as_deref(),
            self.strip.as_deref(),
            self.plain.as_deref(),
        )
    }
}

/// Cursor position, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CursorPosition {
    pub row: usize,
    pub col: usize,
}

impl From<(usize, usize)> for CursorPosition {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Response for `GET /api/output`.
#[derive(Debug, Clone, Serialize)]
pub struct OutputResponse {
    /// Lines joined with `\n`.
    pub output: String,
    /// Lines, oldest first.
    pub lines: Vec<String>,
    pub cursor: CursorPosition,
}

impl OutputResponse {
    pub fn new(lines: Vec<String>, cursor: (usize, usize)) -> Self {
        Self {
            output: lines.join("\n"),
            lines,
            cursor: cursor.into(),
        }
    }
}

/// Query for `GET /api/raw`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub lines: Option<String>,
}

/// Response for `GET /api/raw`.
#[derive(Debug, Clone, Serialize)]
pub struct RawResponse {
    pub count: usize,
    pub chunks: Vec<String>,
}

/// Body for `POST /api/input`.
///
/// `text` is written first, then `control`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputRequest {
    /// Literal text, e.g. `"ls -la\n"`.
    #[serde(default)]
    pub text: Option<String>,
    /// A single letter sent as its control byte, e.g. `"c"` for Ctrl+C.
    #[serde(default)]
    pub control: Option<String>,
}

/// Body for `POST /api/resize`.
///
/// Both fields are required; they are optional here so that a missing
/// one gets the same error as a zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResizeRequest {
    #[serde(default)]
    pub cols: Option<u16>,
    #[serde(default)]
    pub rows: Option<u16>,
}

/// Generic success acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Response for the health endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Response for `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub lines: usize,
    pub max_lines: usize,
    pub raw_chunks: usize,
    pub max_buffer_size: usize,
    pub cursor: CursorPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub shell_attached: bool,
}

impl StatusResponse {
    pub fn new(status: TerminalStatus, shell_attached: bool) -> Self {
        Self {
            lines: status.lines,
            max_lines: status.max_lines,
            raw_chunks: status.raw_chunks,
            max_buffer_size: status.max_buffer_size,
            cursor: status.cursor.into(),
            title: status.title,
            shell_attached,
        }
    }
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "SHELL_UNAVAILABLE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn shell_unavailable() -> Self {
        Self::new("SHELL_UNAVAILABLE", "Terminal not available")
    }

    pub fn invalid_control(value: &str) -> Self {
        Self::new("INVALID_CONTROL", "control must be a single letter a-z")
            .with_details(format!("got {:?}", value))
    }

    pub fn invalid_size(details: impl Into<String>) -> Self {
        Self::new("INVALID_SIZE", "cols and rows must be positive integers").with_details(details)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
