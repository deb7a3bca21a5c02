//! Forwarding typed input to the shell.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::ShellMirrorError;
use crate::Result;

/// Map a letter to its control byte: `a` → 0x01 … `z` → 0x1A.
///
/// Case-insensitive. Anything other than exactly one ASCII letter is
/// rejected rather than turned into an arbitrary byte.
pub fn control_byte(letter: &str) -> Result<u8> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Ok(c.to_ascii_lowercase() as u8 - b'a' + 1)
        }
        _ => Err(ShellMirrorError::InvalidControl(letter.to_string())),
    }
}

/// Cloneable sender for shell input.
///
/// Starts detached; the shell host attaches the PTY writer's channel once
/// the shell is running and detaches it when the shell exits.
#[derive(Debug, Clone, Default)]
pub struct InputForwarder {
    tx: Arc<RwLock<Option<mpsc::Sender<Vec<u8>>>>>,
}

impl InputForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, tx: mpsc::Sender<Vec<u8>>) -> Result<()> {
        let mut slot = self
            .tx
            .write()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        *slot = Some(tx);
        debug!("input attached");
        Ok(())
    }

    pub fn detach(&self) -> Result<()> {
        let mut slot = self
            .tx
            .write()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        if slot.take().is_some() {
            debug!("input detached");
        }
        Ok(())
    }

    /// True while a shell is accepting input.
    pub fn is_attached(&self) -> bool {
        self.tx
            .read()
            .map(|slot| slot.as_ref().is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }

    /// Write `text` to the shell verbatim.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.send(text.as_bytes().to_vec()).await
    }

    /// Send the control byte for `letter` (e.g. `"c"` for Ctrl+C).
    pub async fn send_control(&self, letter: &str) -> Result<()> {
        let byte = control_byte(letter)?;
        self.send(vec![byte]).await
    }

    async fn send(&self, data: Vec<u8>) -> Result<()> {
        // clone out of the lock; never hold it across the await
        let tx = self
            .tx
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?
            .clone()
            .ok_or(ShellMirrorError::ShellUnavailable)?;

        trace!(bytes = data.len(), "forwarding input");
        if tx.send(data).await.is_err() {
            self.detach()?;
            return Err(ShellMirrorError::ShellUnavailable);
        }
        Ok(())
    }
}
