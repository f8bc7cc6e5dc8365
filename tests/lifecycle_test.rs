// Integration tests for the start/stop/restart/status lifecycle
#![cfg(unix)]

use daemonctl::daemon::{Daemon, Foreground};
use daemonctl::DaemonError;
use nix::sys::signal::Signal;
use std::cell::Cell;
use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Child, Command};
use std::rc::Rc;
use tempfile::TempDir;

fn spawn_sleep() -> Child {
    Command::new("sleep").arg("30").spawn().unwrap()
}

/// PID of a process that has already exited and been reaped
fn dead_pid() -> u32 {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}

fn test_daemon(
    path: &Path,
    runs: Rc<Cell<usize>>,
) -> Daemon<impl FnMut() -> anyhow::Result<()>> {
    let worker = move || -> anyhow::Result<()> {
        runs.set(runs.get() + 1);
        Ok(())
    };
    Daemon::new(worker)
        .with_pid_file(path)
        .with_detacher(Foreground)
        .cleanup_on_signal(false)
}

#[test]
fn test_start_with_stubbed_detach() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("f.pid");
    assert!(!path.exists());

    let runs = Rc::new(Cell::new(0));
    let mut daemon = test_daemon(&path, runs.clone());

    let guard = daemon.start().unwrap();
    assert_eq!(runs.get(), 1);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        std::process::id().to_string()
    );
    assert!(daemon.status());

    drop(guard);
    assert!(!path.exists());
    assert!(!daemon.status());
}

#[test]
fn test_stop_terminates_process_and_removes_pid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sleep.pid");
    let mut child = spawn_sleep();
    fs::write(&path, format!("{}\n", child.id())).unwrap();

    let daemon = test_daemon(&path, Rc::new(Cell::new(0)));
    assert!(daemon.status());
    assert_eq!(daemon.report().pid, Some(child.id() as i32));

    daemon.stop().unwrap();
    assert!(!path.exists());

    let status = child.wait().unwrap();
    assert_eq!(status.signal(), Some(Signal::SIGTERM as i32));
}

#[test]
fn test_stop_dead_pid_fails_and_keeps_pid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stale.pid");
    let pid = dead_pid();
    fs::write(&path, pid.to_string()).unwrap();

    let daemon = test_daemon(&path, Rc::new(Cell::new(0)));
    assert!(!daemon.status());

    let err = daemon.stop().unwrap_err();
    match err {
        DaemonError::KillFailed { pid: failed, .. } => assert_eq!(failed as u32, pid),
        other => panic!("unexpected error: {}", other),
    }
    assert!(path.exists());
}

#[test]
fn test_start_refuses_dead_pid() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stale.pid");
    fs::write(&path, dead_pid().to_string()).unwrap();

    let runs = Rc::new(Cell::new(0));
    let mut daemon = test_daemon(&path, runs.clone());

    assert!(matches!(
        daemon.start(),
        Err(DaemonError::AlreadyRunning { .. })
    ));
    assert_eq!(runs.get(), 0);
}

#[test]
fn test_restart_stops_then_starts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("restart.pid");
    let mut child = spawn_sleep();
    fs::write(&path, child.id().to_string()).unwrap();

    let runs = Rc::new(Cell::new(0));
    let mut daemon = test_daemon(&path, runs.clone());

    let guard = daemon.restart().unwrap();

    assert_eq!(child.wait().unwrap().signal(), Some(Signal::SIGTERM as i32));
    assert_eq!(runs.get(), 1);
    assert_eq!(daemon.pid_file().read() as u32, std::process::id());

    drop(guard);
    assert!(!path.exists());
}

#[test]
fn test_restart_not_running_never_starts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("none.pid");

    let runs = Rc::new(Cell::new(0));
    let mut daemon = test_daemon(&path, runs.clone());

    assert!(matches!(
        daemon.restart(),
        Err(DaemonError::NotRunning { .. })
    ));
    assert_eq!(runs.get(), 0);
}
