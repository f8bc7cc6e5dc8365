use std::path::PathBuf;
use thiserror::Error;

/// Main error type for daemon lifecycle operations
#[derive(Debug, Error)]
pub enum DaemonError {
    // Lifecycle errors
    #[error("pidfile {} already exists (pid {pid}). Daemon already running?", pid_file.display())]
    AlreadyRunning { pid: i32, pid_file: PathBuf },

    #[error("pidfile {} does not exist. Daemon not running?", pid_file.display())]
    NotRunning { pid_file: PathBuf },

    #[error("Could not kill daemon process with ID: {pid}")]
    KillFailed {
        pid: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed starting daemon process: {0}")]
    DaemonStart(String),

    // PID file errors
    #[error("Could not write PID file at {}", path.display())]
    PidFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not delete PID file at {}", path.display())]
    PidFileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    // Errors returned by the run routine
    #[error("Worker failed: {0:#}")]
    Worker(anyhow::Error),
}

/// Result type alias for daemon operations
pub type Result<T> = std::result::Result<T, DaemonError>;
