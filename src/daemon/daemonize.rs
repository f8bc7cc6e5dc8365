// Daemonization support for Unix systems

use crate::error::{DaemonError, Result};

/// Detaches the current process from its launching terminal.
///
/// Implementations must leave the process running as the daemon when they
/// return `Ok`. Any process that should not become the daemon (the fork
/// parent) must exit before returning.
pub trait Detach {
    fn detach(&self) -> Result<()>;
}

/// The classic fork / chdir / umask / setsid sequence
#[derive(Debug, Clone, Default)]
pub struct ForkDetach {
    /// Point stdin, stdout and stderr at /dev/null once detached
    pub redirect_stdio: bool,
}

impl ForkDetach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect_stdio(mut self, redirect: bool) -> Self {
        self.redirect_stdio = redirect;
        self
    }
}

impl Detach for ForkDetach {
    fn detach(&self) -> Result<()> {
        daemonize(self.redirect_stdio)
    }
}

/// Keeps the worker attached to the invoking process
#[derive(Debug, Clone, Copy, Default)]
pub struct Foreground;

impl Detach for Foreground {
    fn detach(&self) -> Result<()> {
        tracing::debug!("running in foreground, not detaching");
        Ok(())
    }
}

#[cfg(unix)]
pub fn daemonize(redirect_stdio: bool) -> Result<()> {
    use nix::sys::stat::{umask, Mode};
    use nix::unistd::{fork, setsid, ForkResult};

    // SAFETY: the process is single-threaded at this point, so the child may
    // keep running arbitrary code after the fork.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            tracing::debug!(child = child.as_raw(), "forked daemon, parent exiting");
            std::process::exit(0);
        }
        Ok(ForkResult::Child) => {}
        Err(e) => {
            return Err(DaemonError::DaemonStart(format!(
                "Could not fork daemon process: {}",
                e
            )));
        }
    }

    // Don't pin whatever mount the launcher was started from
    std::env::set_current_dir("/").map_err(|e| {
        DaemonError::DaemonStart(format!("Failed to change directory to /: {}", e))
    })?;

    umask(Mode::empty());

    setsid().map_err(|e| DaemonError::DaemonStart(format!("setsid failed: {}", e)))?;

    if redirect_stdio {
        redirect_stdio_to_devnull()?;
    }

    tracing::info!(pid = std::process::id(), "detached from terminal");
    Ok(())
}

#[cfg(unix)]
fn redirect_stdio_to_devnull() -> Result<()> {
    use nix::unistd::dup2;
    use std::fs::OpenOptions;
    use std::os::unix::io::AsRawFd;

    let devnull = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")
        .map_err(|e| DaemonError::DaemonStart(format!("Failed to open /dev/null: {}", e)))?;

    for fd in [0, 1, 2] {
        dup2(devnull.as_raw_fd(), fd).map_err(|e| {
            DaemonError::DaemonStart(format!("Failed to redirect fd {}: {}", fd, e))
        })?;
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn daemonize(_redirect_stdio: bool) -> Result<()> {
    Err(DaemonError::DaemonStart(
        "Daemonization requires fork and setsid, which are only available on Unix systems; \
         run in the foreground under a service manager instead"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_is_noop() {
        let cwd = std::env::current_dir().unwrap();
        Foreground.detach().unwrap();
        assert_eq!(std::env::current_dir().unwrap(), cwd);
    }

    #[test]
    fn test_fork_detach_builder() {
        assert!(!ForkDetach::new().redirect_stdio);
        assert!(ForkDetach::new().redirect_stdio(true).redirect_stdio);
    }
}
