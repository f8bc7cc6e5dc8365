// PID file management for the daemon process

use crate::error::{DaemonError, Result};
use std::cell::OnceCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Manages the PID file of a single daemon instance
#[derive(Debug, Clone)]
pub struct PidFile {
    configured: Option<PathBuf>,
    name: String,
    resolved: OnceCell<PathBuf>,
}

impl PidFile {
    /// Create a PID file manager for the named daemon.
    ///
    /// Without an explicit path the file lives at `<temp_dir>/<name>.pid`,
    /// resolved on first access. Relative paths are anchored to the current
    /// directory here, since the daemon itself runs from `/`.
    pub fn new(name: &str, path: Option<PathBuf>) -> Self {
        Self {
            configured: path.map(absolutize),
            name: name.to_string(),
            resolved: OnceCell::new(),
        }
    }

    /// Create a PID file manager with a custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new("daemon", Some(path.as_ref().to_path_buf()))
    }

    /// Get the path to the PID file
    pub fn path(&self) -> &Path {
        self.resolved.get_or_init(|| match &self.configured {
            Some(path) => path.clone(),
            None => absolutize(std::env::temp_dir().join(format!("{}.pid", self.name))),
        })
    }

    /// Check if the PID file exists
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Read the recorded PID, or 0 if there is none.
    ///
    /// A missing or unreadable file, garbage content, and non-positive values
    /// all read as 0.
    pub fn read(&self) -> i32 {
        match fs::read_to_string(self.path()) {
            Ok(content) => parse_pid(&content),
            Err(_) => 0,
        }
    }

    /// Write the current process PID to the file
    pub fn write(&self) -> Result<()> {
        let pid = std::process::id();
        fs::write(self.path(), pid.to_string()).map_err(|source| DaemonError::PidFileWrite {
            path: self.path().to_path_buf(),
            source,
        })?;
        tracing::debug!(pid, path = %self.path().display(), "wrote PID file");
        Ok(())
    }

    /// Remove the PID file if it exists
    pub fn delete(&self) -> Result<()> {
        if !self.exists() {
            return Ok(());
        }

        match fs::remove_file(self.path()) {
            Ok(()) => {
                tracing::debug!(path = %self.path().display(), "removed PID file");
                Ok(())
            }
            // Someone else got there first
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(DaemonError::PidFileDelete {
                path: self.path().to_path_buf(),
                source,
            }),
        }
    }

    /// Remove the PID file, ignoring failures. Used from exit-time cleanup.
    pub fn delete_quietly(&self) {
        if let Err(e) = self.delete() {
            tracing::warn!("{}", e);
        }
    }

    /// Quietly remove the PID file, but only while it still records this
    /// process. A newer instance may already have claimed the path.
    pub fn release(&self) {
        let pid = self.read();
        if pid > 0 && pid as u32 == std::process::id() {
            self.delete_quietly();
        } else {
            tracing::debug!(pid, path = %self.path().display(), "PID file not ours, leaving it");
        }
    }

    /// Check whether the recorded PID belongs to a live process
    pub fn is_daemon_running(&self) -> bool {
        is_process_running(self.read())
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

/// Parse PID file content the lenient way: leading whitespace is skipped, an
/// optional sign and a run of digits are taken, anything after is ignored.
fn parse_pid(content: &str) -> i32 {
    let trimmed = content.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    if negative || digits_end == 0 {
        return 0;
    }

    // Values past i32::MAX cannot be process IDs
    rest[..digits_end].parse::<i32>().unwrap_or(0)
}

/// Probe a PID with the null signal.
///
/// Non-positive PIDs are never signalled, since `kill(0)` and negative values
/// address process groups.
#[cfg(unix)]
pub fn is_process_running(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    pid > 0 && kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(not(unix))]
pub fn is_process_running(_pid: i32) -> bool {
    false
}
