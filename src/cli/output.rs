// Output formatting for the CLI

use crate::daemon::DaemonStatus;
use colored::*;
use std::error::Error;

/// Print `<name> is running` / `<name> is not running`
pub fn print_status(status: &DaemonStatus) {
    if status.running {
        println!(
            "{} {} is running",
            "✓".green().bold(),
            status.name.cyan()
        );
        if let Some(pid) = status.pid {
            println!("  {}: {}", "PID".bold(), pid);
        }
    } else {
        println!(
            "{} {} is not running",
            "✗".red().bold(),
            status.name.cyan()
        );
    }
    println!("  {}: {}", "PID file".bold(), status.pid_file.display());
}

pub fn print_stopped(name: &str) {
    println!("{} {} stopped", "✓".green().bold(), name.cyan());
}

/// Print an error and its causes to stderr
pub fn print_error(error: &dyn Error) {
    eprintln!("{} {}", "✗ Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }
}
