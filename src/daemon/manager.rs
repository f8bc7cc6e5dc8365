// Daemon lifecycle management

use super::daemonize::{Detach, ForkDetach};
use super::pid::{is_process_running, PidFile};
use super::worker::{daemon_name, Worker};
use crate::config::DaemonConfig;
use crate::error::{DaemonError, Result};
use std::path::{Path, PathBuf};

/// Lifecycle controller for one daemon instance, identified by its PID file
pub struct Daemon<W: Worker> {
    worker: W,
    name: String,
    pid_path: Option<PathBuf>,
    pid_file: PidFile,
    detacher: Box<dyn Detach>,
    cleanup_on_signal: bool,
}

impl<W: Worker> Daemon<W> {
    /// Create a daemon around `worker`, named after the worker type and
    /// detached with a real fork
    pub fn new(worker: W) -> Self {
        let name = worker.name();
        let pid_file = PidFile::new(&name, None);
        Self {
            worker,
            name,
            pid_path: None,
            pid_file,
            detacher: Box::new(ForkDetach::new()),
            cleanup_on_signal: true,
        }
    }

    /// Build a daemon from a loaded configuration
    pub fn from_config(worker: W, config: &DaemonConfig) -> Self {
        let mut daemon = Self::new(worker)
            .with_detacher(ForkDetach::new().redirect_stdio(config.redirect_stdio))
            .cleanup_on_signal(config.cleanup_on_signal);
        if let Some(name) = &config.name {
            daemon = daemon.with_name(name);
        }
        if let Some(path) = &config.pid_file {
            daemon = daemon.with_pid_file(path);
        }
        daemon
    }

    /// Override the daemon name. Only affects the default PID file path.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = daemon_name(name);
        self.pid_file = PidFile::new(&self.name, self.pid_path.clone());
        self
    }

    pub fn with_pid_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.pid_path = Some(path.as_ref().to_path_buf());
        self.pid_file = PidFile::new(&self.name, self.pid_path.clone());
        self
    }

    pub fn with_detacher<D: Detach + 'static>(mut self, detacher: D) -> Self {
        self.detacher = Box::new(detacher);
        self
    }

    /// Whether to remove the PID file when SIGINT or SIGTERM arrives
    pub fn cleanup_on_signal(mut self, enabled: bool) -> Self {
        self.cleanup_on_signal = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid_file(&self) -> &PidFile {
        &self.pid_file
    }

    /// Start the daemon and run the worker.
    ///
    /// Refuses to start while the PID file holds a positive PID, without
    /// checking whether that process is still alive. A stale file has to be
    /// removed by hand.
    ///
    /// Returns once the worker returns. The guard removes the PID file when
    /// dropped, so keep it alive until the process exits.
    pub fn start(&mut self) -> Result<PidFileGuard> {
        let pid = self.pid_file.read();
        if pid > 0 {
            tracing::warn!(pid, path = %self.pid_file.path().display(), "PID file already present");
            return Err(DaemonError::AlreadyRunning {
                pid,
                pid_file: self.pid_file.path().to_path_buf(),
            });
        }

        self.detacher.detach()?;

        if self.cleanup_on_signal {
            install_termination_cleanup(self.pid_file.clone());
        }
        let guard = PidFileGuard::new(self.pid_file.clone());
        self.pid_file.write()?;

        tracing::info!(
            name = %self.name,
            pid = std::process::id(),
            path = %self.pid_file.path().display(),
            "daemon started"
        );

        self.worker.run().map_err(DaemonError::Worker)?;

        tracing::info!(name = %self.name, "worker returned");
        Ok(guard)
    }

    /// Send SIGTERM to the recorded PID and remove the PID file.
    ///
    /// Does not wait for the process to exit.
    pub fn stop(&self) -> Result<()> {
        let pid = self.pid_file.read();
        if pid == 0 {
            return Err(DaemonError::NotRunning {
                pid_file: self.pid_file.path().to_path_buf(),
            });
        }

        terminate(pid)?;
        tracing::info!(pid, name = %self.name, "sent SIGTERM");

        self.pid_file.delete()
    }

    /// Stop, then start. A failed stop aborts the restart.
    pub fn restart(&mut self) -> Result<PidFileGuard> {
        self.stop()?;
        self.start()
    }

    /// Check if the recorded PID belongs to a live, signalable process
    pub fn status(&self) -> bool {
        self.pid_file.is_daemon_running()
    }

    /// Get daemon status information
    pub fn report(&self) -> DaemonStatus {
        let pid = self.pid_file.read();
        let running = is_process_running(pid);
        DaemonStatus {
            name: self.name.clone(),
            running,
            pid: running.then_some(pid),
            pid_file: self.pid_file.path().to_path_buf(),
        }
    }
}

/// Daemon status information
#[derive(Debug, Clone)]
pub struct DaemonStatus {
    pub name: String,
    pub running: bool,
    pub pid: Option<i32>,
    pub pid_file: PathBuf,
}

/// Removes the PID file when dropped, unless another process has claimed it
#[must_use = "dropping the guard removes the PID file"]
#[derive(Debug)]
pub struct PidFileGuard {
    pid_file: PidFile,
}

impl PidFileGuard {
    fn new(pid_file: PidFile) -> Self {
        Self { pid_file }
    }

    pub fn path(&self) -> &Path {
        self.pid_file.path()
    }
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        self.pid_file.release();
    }
}

/// Remove the PID file and exit on SIGINT/SIGTERM. SIGKILL can't be caught,
/// so a killed daemon still leaves its PID file behind.
fn install_termination_cleanup(pid_file: PidFile) {
    let result = ctrlc::set_handler(move || {
        tracing::info!("termination signal received, shutting down");
        pid_file.release();
        std::process::exit(0);
    });

    if let Err(e) = result {
        tracing::warn!("Failed to install termination handler: {}", e);
    }
}

#[cfg(unix)]
fn terminate(pid: i32) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|e| DaemonError::KillFailed {
        pid,
        source: std::io::Error::from(e),
    })
}

#[cfg(not(unix))]
fn terminate(pid: i32) -> Result<()> {
    Err(DaemonError::KillFailed {
        pid,
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "signals are only supported on Unix systems",
        ),
    })
}
