//! PTY (Pseudo-Terminal) abstraction layer.
//!
//! This module provides a platform-independent interface for working with
//! pseudo-terminals. It supports both Unix PTY and Windows ConPTY.

mod async_adapter;
mod native;

pub use async_adapter::{AsyncPtyReader, AsyncPtyWriter};
pub use native::{default_shell, NativePty, SpawnOptions};

use std::io::{Read, Write};

use crate::error::ShellMirrorError;
use crate::Result;

/// Size of a PTY in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize {
    /// Number of rows (height).
    pub rows: u16,
    /// Number of columns (width).
    pub cols: u16,
}

impl PtySize {
    /// Create a new PtySize with the given dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for PtySize {
    fn default() -> Self {
        Self { rows: 30, cols: 80 }
    }
}

/// Owns the PTY master and the child; dropping it closes the PTY.
pub struct PtyProcess {
    master: Box<dyn portable_pty::MasterPty + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
}

impl PtyProcess {
    /// Kill the child process.
    pub fn kill(&mut self) -> Result<()> {
        self.child.kill().map_err(ShellMirrorError::Io)
    }

    /// Check for exit without blocking.
    pub fn try_wait(&mut self) -> Result<Option<portable_pty::ExitStatus>> {
        self.child.try_wait().map_err(ShellMirrorError::Io)
    }

    /// Tell the shell its window changed size.
    pub fn resize(&self, size: PtySize) -> Result<()> {
        self.master
            .resize(native::to_native(size))
            .map_err(|e| ShellMirrorError::Pty(e.to_string()))
    }
}

/// A handle to a spawned PTY process.
pub struct PtyHandle<R: Read + Send, W: Write + Send> {
    /// Reader for the PTY output.
    pub reader: R,
    /// Writer for the PTY input.
    pub writer: W,
    /// Process ID of the spawned child.
    pub pid: u32,
    process: PtyProcess,
}

impl<R: Read + Send, W: Write + Send> PtyHandle<R, W> {
    /// Create a new PtyHandle.
    pub fn new(reader: R, writer: W, pid: u32, process: PtyProcess) -> Self {
        Self {
            reader,
            writer,
            pid,
            process,
        }
    }

    /// Split into the I/O ends and the process that keeps them open.
    pub fn into_parts(self) -> (R, W, PtyProcess) {
        (self.reader, self.writer, self.process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pty_size_default() {
        let size = PtySize::default();
        assert_eq!(size.rows, 30);
        assert_eq!(size.cols, 80);
    }

    #[test]
    fn test_pty_size_new() {
        let size = PtySize::new(40, 120);
        assert_eq!(size.rows, 40);
        assert_eq!(size.cols, 120);
    }

    #[test]
    fn test_pty_size_equality() {
        let size1 = PtySize::new(30, 80);
        let size2 = PtySize::default();
        assert_eq!(size1, size2);

        let size3 = PtySize::new(24, 100);
        assert_ne!(size1, size3);
    }
}
