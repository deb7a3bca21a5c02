//! # shell-mirror
//!
//! Run a shell in a pseudo-terminal and expose what it has drawn.
//!
//! Output from the shell is fed, chunk by chunk and in order, to a
//! [`Terminal`]: a line-oriented screen buffer driven by an ANSI escape
//! parser, plus a bounded log of the raw chunks. Snapshots of the last N
//! lines can be taken at any time, optionally stripped of control
//! sequences. An HTTP API serves those snapshots and passes typed input
//! and window size changes back to the shell.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shell_mirror::api::{serve_with_state, AppState, ServerConfig};
//! use shell_mirror::{InputForwarder, ShellHost, SpawnOptions, TerminalHandle};
//!
//! #[tokio::main]
//! async fn main() -> shell_mirror::Result<()> {
//!     shell_mirror::logging::try_init().ok();
//!
//!     let terminal = TerminalHandle::default();
//!     let input = InputForwarder::new();
//!     let host = ShellHost::spawn(&SpawnOptions::default(), terminal.clone(), input.clone())?;
//!     println!("shell running with PID {}", host.pid());
//!
//!     let state = AppState::new(terminal, input).with_window(host.window());
//!     serve_with_state(ServerConfig::default(), state, async {
//!         tokio::signal::ctrl_c().await.ok();
//!     })
//!     .await?;
//!
//!     host.shutdown()
//! }
//! ```
//!
//! The terminal can also be driven directly:
//!
//! ```
//! use shell_mirror::{SnapshotRequest, Terminal};
//!
//! let mut terminal = Terminal::default();
//! terminal.ingest("\x1b[1mHello\x1b[0m\r\nWorld\n");
//! let lines = terminal.snapshot(&SnapshotRequest::new(2).stripped(true));
//! assert_eq!(lines, vec!["World", ""]);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod output;
pub mod pty;
pub mod terminal;

// Re-export commonly used types
pub use error::{Result, ShellMirrorError};
pub use host::{InputForwarder, ShellHost, ShellWindow};
pub use output::{OutputSanitizer, StripMode};
pub use pty::{NativePty, PtyHandle, PtySize, SpawnOptions};
pub use terminal::{
    BoundaryPolicy, ScreenBuffer, SnapshotRequest, Terminal, TerminalConfig, TerminalHandle,
    TerminalStatus, MAX_COLS,
};
