//! Thread-safe access to a shared [`Terminal`].

use std::sync::{Arc, RwLock};

use super::emulator::{Terminal, TerminalConfig};
use super::parser::ChunkSummary;
use super::snapshot::SnapshotRequest;
use crate::error::ShellMirrorError;
use crate::Result;

/// Point-in-time view of the terminal for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalStatus {
    pub lines: usize,
    pub max_lines: usize,
    pub raw_chunks: usize,
    pub max_buffer_size: usize,
    pub cursor: (usize, usize),
    pub title: Option<String>,
}

/// Cloneable handle to one terminal.
///
/// Ingestion and reset take the write lock; snapshots take the read lock.
/// A reader therefore never sees a chunk half applied or a reset half done.
/// Only one task should call [`ingest`](Self::ingest), in arrival order.
#[derive(Debug, Clone)]
pub struct TerminalHandle {
    inner: Arc<RwLock<Terminal>>,
}

impl TerminalHandle {
    pub fn new(config: TerminalConfig) -> Result<Self> {
        Ok(Self::from_terminal(Terminal::new(config)?))
    }

    pub fn from_terminal(terminal: Terminal) -> Self {
        Self {
            inner: Arc::new(RwLock::new(terminal)),
        }
    }

    /// Apply one chunk of shell output.
    pub fn ingest(&self, chunk: &str) -> Result<ChunkSummary> {
        let mut terminal = self
            .inner
            .write()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        Ok(terminal.ingest(chunk))
    }

    /// Render the screen tail for `request`.
    pub fn snapshot(&self, request: &SnapshotRequest) -> Result<Vec<String>> {
        let terminal = self
            .inner
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        Ok(terminal.snapshot(request))
    }

    /// Screen tail and cursor, read under one lock so they agree.
    pub fn snapshot_with_cursor(
        &self,
        request: &SnapshotRequest,
    ) -> Result<(Vec<String>, (usize, usize))> {
        let terminal = self
            .inner
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        Ok((terminal.snapshot(request), terminal.screen().cursor()))
    }

    /// The last `count` raw chunks.
    pub fn raw_tail(&self, count: usize) -> Result<Vec<String>> {
        let terminal = self
            .inner
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        Ok(terminal.raw_tail(count))
    }

    pub fn cursor(&self) -> Result<(usize, usize)> {
        let terminal = self
            .inner
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        Ok(terminal.screen().cursor())
    }

    pub fn status(&self) -> Result<TerminalStatus> {
        let terminal = self
            .inner
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        Ok(TerminalStatus {
            lines: terminal.screen().len(),
            max_lines: terminal.screen().max_lines(),
            raw_chunks: terminal.raw_log().len(),
            max_buffer_size: terminal.raw_log().capacity(),
            cursor: terminal.screen().cursor(),
            title: terminal.title().map(str::to_string),
        })
    }

    /// Clear screen, raw log and parser state in one step.
    pub fn reset(&self) -> Result<()> {
        let mut terminal = self
            .inner
            .write()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        terminal.reset();
        Ok(())
    }
}

impl Default for TerminalHandle {
    fn default() -> Self {
        Self::from_terminal(Terminal::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_and_snapshot() {
        let handle = TerminalHandle::default();
        handle.ingest("a\r\nb").unwrap();

        let lines = handle.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(handle.cursor().unwrap(), (1, 1));
    }

    #[test]
    fn test_snapshot_with_cursor() {
        let handle = TerminalHandle::default();
        handle.ingest("one\r\ntwo").unwrap();

        let (lines, cursor) = handle
            .snapshot_with_cursor(&SnapshotRequest::default())
            .unwrap();
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(cursor, (1, 3));
        assert_eq!(cursor, handle.cursor().unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let handle = TerminalHandle::default();
        let other = handle.clone();
        handle.ingest("shared").unwrap();

        assert_eq!(
            other.snapshot(&SnapshotRequest::default()).unwrap(),
            vec!["shared"]
        );
    }

    #[test]
    fn test_status() {
        let handle = TerminalHandle::new(TerminalConfig {
            max_lines: 50,
            max_buffer_size: 10,
            ..TerminalConfig::default()
        })
        .unwrap();
        handle.ingest("\x1b]0;build\x07x").unwrap();

        let status = handle.status().unwrap();
        assert_eq!(status.lines, 1);
        assert_eq!(status.max_lines, 50);
        assert_eq!(status.raw_chunks, 1);
        assert_eq!(status.max_buffer_size, 10);
        assert_eq!(status.cursor, (0, 1));
        assert_eq!(status.title.as_deref(), Some("build"));
    }

    #[test]
    fn test_reset() {
        let handle = TerminalHandle::default();
        handle.ingest("one\r\ntwo\r\n").unwrap();
        handle.reset().unwrap();

        assert_eq!(
            handle.snapshot(&SnapshotRequest::new(5)).unwrap(),
            vec![String::new()]
        );
        assert!(handle.raw_tail(5).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_readers_see_whole_chunks() {
        use std::thread;

        let handle = TerminalHandle::new(TerminalConfig {
            max_lines: 10,
            ..TerminalConfig::default()
        })
        .unwrap();

        let writer = {
            let handle = handle.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    // each chunk writes a full line; a reader must never see half of one
                    handle.ingest("0123456789\r\n").unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let lines = handle.snapshot(&SnapshotRequest::new(10)).unwrap();
                        assert!(lines.len() <= 10);
                        for line in &lines[..lines.len() - 1] {
                            assert_eq!(line, "0123456789");
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
