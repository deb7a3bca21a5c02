//! The owned terminal: screen, parser and raw log behind one lifecycle.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::buffer::ScreenBuffer;
use super::parser::{BoundaryPolicy, ChunkSummary, Parser};
use super::raw_log::RawLog;
use super::snapshot::SnapshotRequest;
use super::{DEFAULT_MAX_BUFFER_SIZE, DEFAULT_MAX_LINES};
use crate::error::ShellMirrorError;
use crate::Result;

/// Capacities and parsing policy for a [`Terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Lines retained by the screen buffer.
    pub max_lines: usize,
    /// Raw chunks retained by the diagnostic log.
    pub max_buffer_size: usize,
    /// Treatment of sequences left open at the end of a chunk.
    pub boundary_policy: BoundaryPolicy,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            boundary_policy: BoundaryPolicy::Carry,
        }
    }
}

impl TerminalConfig {
    /// Reject capacities that cannot hold anything.
    pub fn validate(&self) -> Result<()> {
        if self.max_lines == 0 {
            return Err(ShellMirrorError::InvalidConfig(
                "max_lines must be at least 1".into(),
            ));
        }
        if self.max_buffer_size == 0 {
            return Err(ShellMirrorError::InvalidConfig(
                "max_buffer_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Reconstructed terminal state for one shell.
///
/// Every chunk goes to two independent sinks: the raw log keeps it
/// verbatim, the parser applies it to the screen. Chunks must arrive in
/// the order the shell produced them.
#[derive(Debug, Clone)]
pub struct Terminal {
    screen: ScreenBuffer,
    parser: Parser,
    raw: RawLog,
    title: Option<String>,
    config: TerminalConfig,
}

impl Terminal {
    /// Create a terminal in its initial state.
    pub fn new(config: TerminalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: TerminalConfig) -> Self {
        Self {
            screen: ScreenBuffer::new(config.max_lines),
            parser: Parser::new(config.boundary_policy),
            raw: RawLog::new(config.max_buffer_size),
            title: None,
            config,
        }
    }

    /// Record and apply one chunk of shell output.
    pub fn ingest(&mut self, chunk: &str) -> ChunkSummary {
        self.raw.push(chunk);
        let summary = self.parser.advance(&mut self.screen, chunk);

        if let Some(title) = &summary.title {
            self.title = Some(title.clone());
        }

        if summary.is_osc_only() {
            trace!(osc = summary.osc, "title-only chunk");
        } else {
            trace!(
                bytes = chunk.len(),
                printed = summary.printed,
                csi = summary.csi,
                "chunk applied"
            );
        }
        if summary.abandoned > 0 {
            debug!(abandoned = summary.abandoned, "dropped incomplete sequences");
        }

        summary
    }

    /// Lines for `request`, oldest first.
    pub fn snapshot(&self, request: &SnapshotRequest) -> Vec<String> {
        request.render(&self.screen)
    }

    /// The last `count` raw chunks, oldest first.
    pub fn raw_tail(&self, count: usize) -> Vec<String> {
        self.raw.tail(count)
    }

    /// Back to the initial state: one empty line, empty raw log.
    pub fn reset(&mut self) {
        *self = Self::from_valid(self.config);
        debug!("terminal reset");
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn raw_log(&self) -> &RawLog {
        &self.raw
    }

    /// Window title from the last OSC 0 or OSC 2.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::from_valid(TerminalConfig::default())
    }
}
