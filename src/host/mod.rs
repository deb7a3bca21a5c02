//! Running the shell and wiring it to the terminal.
//!
//! [`ShellHost::spawn`] starts the shell in a PTY and three tasks:
//! a blocking reader, a blocking writer, and the pump. The pump is the
//! only caller of [`TerminalHandle::ingest`], and it takes chunks off a
//! single channel, so the terminal sees output exactly in read order.

mod decoder;
mod input;
mod window;

pub use decoder::Utf8Decoder;
pub use input::{control_byte, InputForwarder};
pub use window::{checked_size, Resize, ShellWindow};

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::pty::{AsyncPtyReader, AsyncPtyWriter, NativePty, PtyProcess, PtySize, SpawnOptions};
use crate::error::ShellMirrorError;
use crate::terminal::TerminalHandle;
use crate::Result;

/// Chunks buffered between the PTY reader and the pump.
const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// Input messages buffered ahead of the PTY writer.
const INPUT_CHANNEL_CAPACITY: usize = 64;

/// A running shell feeding a terminal.
pub struct ShellHost {
    pid: u32,
    process: Arc<Mutex<PtyProcess>>,
    pump: JoinHandle<()>,
    input: InputForwarder,
    window: ShellWindow,
}

impl ShellHost {
    /// Spawn the shell and start mirroring it into `terminal`.
    ///
    /// `input` is attached to the shell for as long as it runs.
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        options: &SpawnOptions,
        terminal: TerminalHandle,
        input: InputForwarder,
    ) -> Result<Self> {
        let handle = NativePty::new().spawn(options)?;
        let pid = handle.pid;
        let (reader, writer, process) = handle.into_parts();
        let process = Arc::new(Mutex::new(process));
        let window = ShellWindow::new();

        let (output_tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);

        tokio::spawn(AsyncPtyReader::new(reader, output_tx).run());
        tokio::spawn(AsyncPtyWriter::new(writer, input_rx).run());
        input.attach(input_tx)?;
        window.attach(process.clone())?;

        let pump = tokio::spawn(pump(output_rx, terminal, input.clone(), window.clone()));

        info!(pid, "shell attached");
        Ok(Self {
            pid,
            process,
            pump,
            input,
            window,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// True until the shell's output stream ends.
    pub fn is_running(&self) -> bool {
        !self.pump.is_finished()
    }

    /// Wait for the shell's output to end.
    pub async fn wait(&mut self) {
        if self.pump.is_finished() {
            return;
        }
        if let Err(e) = (&mut self.pump).await {
            error!("output pump failed: {}", e);
        }
    }

    /// Handle for resizing the shell's window from elsewhere.
    pub fn window(&self) -> ShellWindow {
        self.window.clone()
    }

    /// Tell the shell its window is now `size`.
    pub fn resize(&self, size: PtySize) -> Result<()> {
        self.window.resize(size)
    }

    /// Kill the shell and stop forwarding input.
    pub fn shutdown(self) -> Result<()> {
        self.input.detach()?;
        self.window.detach()?;
        let mut process = self
            .process
            .lock()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        if let Ok(None) = process.try_wait() {
            process.kill()?;
        }
        info!(pid = self.pid, "shell stopped");
        Ok(())
    }
}

/// Decode and ingest chunks, strictly in arrival order.
async fn pump(
    mut rx: mpsc::Receiver<Vec<u8>>,
    terminal: TerminalHandle,
    input: InputForwarder,
    window: ShellWindow,
) {
    let mut decoder = Utf8Decoder::new();

    while let Some(bytes) = rx.recv().await {
        let text = decoder.decode(&bytes);
        if text.is_empty() {
            continue;
        }
        if let Err(e) = terminal.ingest(&text) {
            error!("dropping output, terminal unavailable: {}", e);
            break;
        }
    }

    if decoder.pending() > 0 {
        warn!(bytes = decoder.pending(), "shell output ended mid-character");
    }
    if let Err(e) = input.detach() {
        error!("failed to detach input: {}", e);
    }
    if let Err(e) = window.detach() {
        error!("failed to detach window: {}", e);
    }
    info!("shell output closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::SnapshotRequest;

    #[tokio::test]
    async fn test_pump_ingests_in_order() {
        let terminal = TerminalHandle::default();
        let input = InputForwarder::new();
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(pump(rx, terminal.clone(), input, ShellWindow::new()));

        tx.send(b"first\r\n".to_vec()).await.unwrap();
        tx.send(b"\x1b[".to_vec()).await.unwrap();
        tx.send(b"2Ksecond\r\n".to_vec()).await.unwrap();
        drop(tx);
        task.await.unwrap();

        let lines = terminal.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(lines, vec!["first", "second", ""]);
        assert_eq!(terminal.raw_tail(10).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_pump_reassembles_utf8() {
        let terminal = TerminalHandle::default();
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(pump(
            rx,
            terminal.clone(),
            InputForwarder::new(),
            ShellWindow::new(),
        ));

        let bytes = "ü".as_bytes();
        tx.send(vec![b'x', bytes[0]]).await.unwrap();
        tx.send(vec![bytes[1]]).await.unwrap();
        drop(tx);
        task.await.unwrap();

        let lines = terminal.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(lines, vec!["xü"]);
    }

    #[tokio::test]
    async fn test_pump_detaches_on_close() {
        struct Ignore;
        impl Resize for Ignore {
            fn resize(&self, _size: PtySize) -> Result<()> {
                Ok(())
            }
        }

        let input = InputForwarder::new();
        let (input_tx, _input_rx) = mpsc::channel(1);
        input.attach(input_tx).unwrap();
        let window = ShellWindow::new();
        window.attach(Arc::new(Ignore)).unwrap();

        let (tx, rx) = mpsc::channel::<Vec<u8>>(1);
        let task = tokio::spawn(pump(
            rx,
            TerminalHandle::default(),
            input.clone(),
            window.clone(),
        ));
        drop(tx);
        task.await.unwrap();

        assert!(!input.is_attached());
        assert!(!window.is_attached());
        assert!(matches!(
            window.resize(PtySize::default()),
            Err(ShellMirrorError::ShellUnavailable)
        ));
    }

    #[tokio::test]
    #[ignore = "Requires PTY"]
    #[cfg(unix)]
    async fn test_spawn_echo() {
        use std::time::Duration;

        let terminal = TerminalHandle::default();
        let input = InputForwarder::new();
        let options = SpawnOptions {
            shell: Some("/bin/sh".to_string()),
            ..SpawnOptions::default()
        };
        let mut host = ShellHost::spawn(&options, terminal.clone(), input.clone()).unwrap();
        assert!(host.pid() > 0);

        input.send_text("echo MIRROR_OK; exit\n").await.unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(5), host.wait()).await;

        let lines = terminal
            .snapshot(&SnapshotRequest::new(50).stripped(true))
            .unwrap();
        assert!(lines.iter().any(|l| l == "MIRROR_OK"));
        host.shutdown().unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires PTY"]
    #[cfg(unix)]
    async fn test_resize_reaches_shell() {
        use std::time::Duration;

        let terminal = TerminalHandle::default();
        let input = InputForwarder::new();
        let options = SpawnOptions {
            shell: Some("/bin/sh".to_string()),
            ..SpawnOptions::default()
        };
        let mut host = ShellHost::spawn(&options, terminal.clone(), input.clone()).unwrap();
        assert!(host.window().is_attached());

        host.resize(PtySize::new(33, 111)).unwrap();
        assert!(host.resize(PtySize::new(0, 111)).is_err());

        input.send_text("stty size; exit\n").await.unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(5), host.wait()).await;

        let lines = terminal
            .snapshot(&SnapshotRequest::new(50).stripped(true))
            .unwrap();
        assert!(lines.iter().any(|l| l.trim() == "33 111"));
        host.shutdown().unwrap();
    }
}
