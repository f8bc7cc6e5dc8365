// The run routine supplied by a concrete daemon

/// A blocking unit of work run inside the daemon process.
///
/// `run` is expected to loop until the process is terminated. If it returns,
/// the daemon is considered finished and the caller exits.
pub trait Worker {
    fn run(&mut self) -> anyhow::Result<()>;

    /// Name used for the default PID file location
    fn name(&self) -> String {
        daemon_name(short_type_name(std::any::type_name::<Self>()))
    }
}

impl<F> Worker for F
where
    F: FnMut() -> anyhow::Result<()>,
{
    fn run(&mut self) -> anyhow::Result<()> {
        self()
    }
}

/// Sanitize a raw name: ASCII letters only, lowercased.
///
/// Falls back to `daemon` when nothing survives.
pub fn daemon_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if name.is_empty() {
        "daemon".to_string()
    } else {
        name
    }
}

/// `my_crate::workers::Sleeper<u8>` -> `Sleeper`
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyDaemon;

    impl Worker for EmptyDaemon {
        fn run(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Generic<T>(T);

    impl<T> Worker for Generic<T> {
        fn run(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_name_from_type() {
        assert_eq!(EmptyDaemon.name(), "emptydaemon");
        assert_eq!(Generic(1u8).name(), "generic");
    }

    #[test]
    fn test_daemon_name_sanitizes() {
        assert_eq!(daemon_name("PHPDaemon\\Daemon"), "phpdaemondaemon");
        assert_eq!(daemon_name("my-worker_2"), "myworker");
        assert_eq!(daemon_name("123"), "daemon");
    }

    #[test]
    fn test_closure_is_a_worker() {
        let mut calls = 0;
        let mut worker = || {
            calls += 1;
            Ok::<(), anyhow::Error>(())
        };
        worker.run().unwrap();
        worker.run().unwrap();
        assert_eq!(calls, 2);
    }
}
