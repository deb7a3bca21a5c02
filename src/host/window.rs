//! Changing the shell's window size.

use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::error::ShellMirrorError;
use crate::pty::{PtyProcess, PtySize};
use crate::Result;

/// Anything whose window size can be changed.
pub trait Resize: Send + Sync {
    fn resize(&self, size: PtySize) -> Result<()>;
}

impl Resize for Mutex<PtyProcess> {
    fn resize(&self, size: PtySize) -> Result<()> {
        self.lock()
            .map_err(|_| ShellMirrorError::LockPoisoned)?
            .resize(size)
    }
}

/// Reject sizes with a zero dimension.
pub fn checked_size(cols: Option<u16>, rows: Option<u16>) -> Result<PtySize> {
    match (cols, rows) {
        (Some(cols), Some(rows)) if cols > 0 && rows > 0 => Ok(PtySize::new(rows, cols)),
        (cols, rows) => Err(ShellMirrorError::InvalidSize(format!(
            "cols and rows must both be positive, got cols={} rows={}",
            describe(cols),
            describe(rows)
        ))),
    }
}

fn describe(value: Option<u16>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| v.to_string())
}

/// Cloneable access to the running shell's window size.
///
/// Works like [`InputForwarder`](super::InputForwarder): detached until the
/// shell host attaches its PTY, detached again when the shell exits.
#[derive(Clone, Default)]
pub struct ShellWindow {
    target: Arc<RwLock<Option<Arc<dyn Resize>>>>,
}

impl ShellWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, target: Arc<dyn Resize>) -> Result<()> {
        let mut slot = self
            .target
            .write()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        *slot = Some(target);
        debug!("window attached");
        Ok(())
    }

    pub fn detach(&self) -> Result<()> {
        let mut slot = self
            .target
            .write()
            .map_err(|_| ShellMirrorError::LockPoisoned)?;
        if slot.take().is_some() {
            debug!("window detached");
        }
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.target
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Resize the shell's PTY.
    pub fn resize(&self, size: PtySize) -> Result<()> {
        let target = self
            .target
            .read()
            .map_err(|_| ShellMirrorError::LockPoisoned)?
            .clone()
            .ok_or(ShellMirrorError::ShellUnavailable)?;

        let size = checked_size(Some(size.cols), Some(size.rows))?;
        target.resize(size)?;
        debug!(cols = size.cols, rows = size.rows, "window resized");
        Ok(())
    }
}

impl std::fmt::Debug for ShellWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellWindow")
            .field("attached", &self.is_attached())
            .finish()
    }
}
