// Daemon module - PID-file controlled background process lifecycle

pub mod daemonize;
pub mod manager;
pub mod pid;
pub mod worker;

pub use daemonize::{daemonize, Detach, ForkDetach, Foreground};
pub use manager::{Daemon, DaemonStatus, PidFileGuard};
pub use pid::{is_process_running, PidFile};
pub use worker::{daemon_name, Worker};
