// CLI module - start|stop|restart|status dispatcher for a daemon binary

mod output;

use crate::config::DaemonConfig;
use crate::daemon::{Daemon, Foreground, Worker};
use crate::error::Result;
use crate::logging;
use clap::{ArgAction, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

/// Control a PID-file managed background daemon
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Verb,

    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// PID file location
    #[arg(short, long, global = true)]
    pub pid_file: Option<PathBuf>,

    /// Daemon name, used for the default PID file location
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Run the worker without detaching from the terminal
    #[arg(short, long, global = true)]
    pub foreground: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Verb {
    /// Detach and run the daemon
    Start,
    /// Send SIGTERM to the running daemon
    Stop,
    /// Stop, then start
    Restart,
    /// Report whether the daemon is running
    Status,
}

impl Cli {
    /// Merge command line overrides into a loaded configuration
    fn apply(&self, config: &mut DaemonConfig) {
        if let Some(name) = &self.name {
            config.name = Some(name.clone());
        }
        if let Some(pid_file) = &self.pid_file {
            config.pid_file = Some(pid_file.clone());
        }
        match self.verbose {
            0 => {}
            1 => config.log_level = "debug".to_string(),
            _ => config.log_level = "trace".to_string(),
        }
    }
}

/// Run the CLI with the process arguments, for use as a binary's `main`.
///
/// Usage errors exit with status 2 from inside clap. Lifecycle errors are
/// printed and reported as status 1.
pub fn main<W: Worker>(worker: W) -> ExitCode {
    match run(worker, std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Parse `args` (including the program name) and dispatch the verb
pub fn run<W, I, T>(worker: W, args: I) -> Result<()>
where
    W: Worker,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_file(path)?,
        None => DaemonConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    logging::init(&config.log_level);

    let mut daemon = Daemon::from_config(worker, &config);
    if cli.foreground {
        daemon = daemon.with_detacher(Foreground);
    }

    execute(&mut daemon, cli.command)
}

/// Dispatch one verb against a configured daemon
pub fn execute<W: Worker>(daemon: &mut Daemon<W>, verb: Verb) -> Result<()> {
    match verb {
        Verb::Start => {
            let _guard = daemon.start()?;
        }
        Verb::Stop => {
            daemon.stop()?;
            output::print_stopped(daemon.name());
        }
        Verb::Restart => {
            let _guard = daemon.restart()?;
        }
        Verb::Status => {
            output::print_status(&daemon.report());
        }
    }
    Ok(())
}
