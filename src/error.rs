//! Error types for shell-mirror.

use thiserror::Error;

/// Main error type for shell-mirror operations.
#[derive(Error, Debug)]
pub enum ShellMirrorError {
    /// PTY-related error.
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// No shell process is attached to receive input.
    #[error("shell not available")]
    ShellUnavailable,

    /// Control input was not a single letter `a`-`z`.
    #[error("invalid control character: {0:?} (expected a single letter a-z)")]
    InvalidControl(String),

    /// Terminal configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Window size with a zero or missing dimension.
    #[error("invalid window size: {0}")]
    InvalidSize(String),
}

/// Convenience Result type for shell-mirror operations.
pub type Result<T> = std::result::Result<T, ShellMirrorError>;
