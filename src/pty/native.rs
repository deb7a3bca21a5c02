//! Native PTY implementation using portable-pty.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;

use portable_pty::{native_pty_system, CommandBuilder, PtySize as NativePtySize};
use tracing::debug;

use super::{PtyHandle, PtyProcess, PtySize};
use crate::error::ShellMirrorError;
use crate::Result;

/// Terminal type advertised to the shell.
const TERM_NAME: &str = "xterm-color";

/// Get the default shell for the current platform.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
}

pub(super) fn to_native(size: PtySize) -> NativePtySize {
    NativePtySize {
        rows: size.rows,
        cols: size.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// How to launch the shell.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Shell program; the platform default when `None`.
    pub shell: Option<String>,
    /// Starting directory; the user's home when `None`.
    pub working_dir: Option<PathBuf>,
    /// Extra environment on top of the inherited one.
    pub env: HashMap<String, String>,
    /// Initial window size.
    pub size: PtySize,
}

/// Wrapper around the native PTY system.
pub struct NativePty {
    pty_system: Box<dyn portable_pty::PtySystem + Send>,
}

impl NativePty {
    /// Create a new NativePty instance.
    pub fn new() -> Self {
        Self {
            pty_system: native_pty_system(),
        }
    }

    /// Spawn a shell process in a new PTY.
    ///
    /// The environment is inherited from this process, with `TERM` set
    /// and `options.env` layered on top.
    pub fn spawn(
        &self,
        options: &SpawnOptions,
    ) -> Result<PtyHandle<Box<dyn Read + Send>, Box<dyn Write + Send>>> {
        let pair = self
            .pty_system
            .openpty(to_native(options.size))
            .map_err(|e| ShellMirrorError::Pty(e.to_string()))?;

        let shell = options.shell.clone().unwrap_or_else(default_shell);
        let mut cmd = CommandBuilder::new(&shell);
        cmd.env("TERM", TERM_NAME);
        for (key, value) in &options.env {
            cmd.env(key, value);
        }
        match &options.working_dir {
            Some(dir) => cmd.cwd(dir),
            None => {
                if let Some(home) = home_dir() {
                    cmd.cwd(home);
                }
            }
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ShellMirrorError::Pty(e.to_string()))?;

        // The child holds its own copy of the slave end.
        drop(pair.slave);

        let pid = child.process_id().unwrap_or(0);
        debug!(%shell, pid, "spawned shell");

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ShellMirrorError::Pty(e.to_string()))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| ShellMirrorError::Pty(e.to_string()))?;

        Ok(PtyHandle::new(
            reader,
            writer,
            pid,
            PtyProcess {
                master: pair.master,
                child,
            },
        ))
    }
}

impl Default for NativePty {
    fn default() -> Self {
        Self::new()
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    let var = "HOME";
    #[cfg(windows)]
    let var = "USERPROFILE";
    std::env::var_os(var).map(PathBuf::from)
}
