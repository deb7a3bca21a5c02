//! Screen reconstruction from a shell's output stream.
//!
//! Raw chunks flow into a [`Terminal`], which keeps them verbatim in a
//! bounded [`RawLog`] and runs them through the escape-sequence
//! [`Parser`] to maintain a bounded [`ScreenBuffer`]. Snapshots read the
//! tail of the screen, optionally cleaned by the output sanitizer.
//!
//! # Example
//!
//! ```
//! use shell_mirror::terminal::{SnapshotRequest, Terminal};
//!
//! let mut term = Terminal::default();
//! term.ingest("Hello\r\nWorld\n");
//!
//! assert_eq!(term.screen().lines(), vec!["Hello", "World", ""]);
//! assert_eq!(term.snapshot(&SnapshotRequest::new(2)), vec!["World", ""]);
//! ```

mod buffer;
mod emulator;
mod handle;
mod parser;
mod raw_log;
mod snapshot;

pub use buffer::{ScreenBuffer, MAX_COLS};
pub use emulator::{Terminal, TerminalConfig};
pub use handle::{TerminalHandle, TerminalStatus};
pub use parser::{BoundaryPolicy, ChunkSummary, Parser, ParserState, MAX_CSI_PARAMS, MAX_OSC_PAYLOAD};
pub use raw_log::RawLog;
pub use snapshot::{SnapshotRequest, DEFAULT_SNAPSHOT_LINES};

/// Default screen capacity in lines.
pub const DEFAULT_MAX_LINES: usize = 1000;

/// Default raw log capacity in chunks.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1000;
