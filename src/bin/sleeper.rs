// Example daemon: sleeps forever, logging every two seconds
//
//   sleeper start|stop|restart|status [--pid-file PATH] [--foreground]

use daemonctl::Worker;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

struct Sleeper {
    interval: Duration,
}

impl Worker for Sleeper {
    fn run(&mut self) -> anyhow::Result<()> {
        loop {
            tracing::info!("zzzZZZzzz...");
            thread::sleep(self.interval);
        }
    }
}

fn main() -> ExitCode {
    daemonctl::cli::main(Sleeper {
        interval: Duration::from_secs(2),
    })
}
