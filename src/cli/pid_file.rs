//! PID file guarding the daemon
//!
//! Only one daemon may own the microphone; a second one refuses to start
//! while the recorded process is alive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::socket::runtime_path;

const PID_FILE_NAME: &str = "voice2notion.pid";

/// Keeps staged file names distinct within one process
static STAGED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// PID file for daemon mode
pub struct PidFile {
    path: PathBuf,
    held: bool,
}

impl PidFile {
    /// PID file in the runtime directory
    pub fn new() -> Self {
        Self::with_path(runtime_path(PID_FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            held: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID of a live daemon recorded in the file, if any.
    /// A file naming a dead process is removed.
    pub fn running_pid(&self) -> Option<u32> {
        let pid: u32 = fs::read_to_string(&self.path).ok()?.trim().parse().ok()?;

        // Signal 0 probes for existence without delivering anything
        match kill(Pid::from_raw(pid as i32), None::<Signal>) {
            Ok(()) => Some(pid),
            Err(nix::errno::Errno::ESRCH) => {
                debug!(pid, path = %self.path.display(), "removing stale PID file");
                let _ = fs::remove_file(&self.path);
                None
            }
            // EPERM: alive but owned by someone else
            Err(_) => Some(pid),
        }
    }

    /// Record this process as the daemon.
    ///
    /// The PID is written to a private file that is then hard-linked into
    /// place; linking fails when the target exists, so two daemons racing
    /// here cannot both win and nobody observes a half-written file.
    pub fn acquire(&mut self) -> Result<(), PidFileError> {
        let staged = self.path.with_extension(format!(
            "pid.{}.{}",
            process::id(),
            STAGED_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&staged, process::id().to_string()).map_err(|e| self.write_failed(e))?;

        let result = self.link_staged(&staged);
        let _ = fs::remove_file(&staged);
        result?;

        self.held = true;
        Ok(())
    }

    fn link_staged(&self, staged: &Path) -> Result<(), PidFileError> {
        // Second attempt follows removal of a stale file
        for _ in 0..2 {
            match fs::hard_link(staged, &self.path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if let Some(pid) = self.running_pid() {
                        return Err(PidFileError::AlreadyRunning(pid));
                    }
                    debug!(path = %self.path.display(), "replacing unreadable PID file");
                    match fs::remove_file(&self.path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                        Err(e) => return Err(self.write_failed(e)),
                    }
                }
                Err(e) => return Err(self.write_failed(e)),
            }
        }

        match self.running_pid() {
            Some(pid) => Err(PidFileError::AlreadyRunning(pid)),
            None => Err(PidFileError::WriteFailed(format!(
                "{}: contended by another process",
                self.path.display()
            ))),
        }
    }

    fn write_failed(&self, e: io::Error) -> PidFileError {
        PidFileError::WriteFailed(format!("{}: {}", self.path.display(), e))
    }

    /// Remove the file if this process holds it
    pub fn release(&mut self) -> Result<(), PidFileError> {
        if !self.held {
            return Ok(());
        }
        self.held = false;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PidFileError::RemoveFailed(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl Default for PidFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("{}", e);
        }
    }
}

/// PID file errors
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another daemon is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Failed to write PID file: {0}")]
    WriteFailed(String),

    #[error("Failed to remove PID file: {0}")]
    RemoveFailed(String),
}
