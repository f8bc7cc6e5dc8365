use crate::error::{DaemonError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Daemon configuration, loadable from a TOML or JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Daemon name (defaults to the worker type name)
    #[serde(default)]
    pub name: Option<String>,

    /// PID file location (defaults to `<temp_dir>/<name>.pid`)
    #[serde(default)]
    pub pid_file: Option<PathBuf>,

    /// Redirect stdin/stdout/stderr to /dev/null after detaching
    #[serde(default)]
    pub redirect_stdio: bool,

    /// Remove the PID file when SIGINT or SIGTERM arrives
    #[serde(default = "default_cleanup_on_signal")]
    pub cleanup_on_signal: bool,

    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions for serde
fn default_cleanup_on_signal() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            name: None,
            pid_file: None,
            redirect_stdio: false,
            cleanup_on_signal: default_cleanup_on_signal(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load the configuration from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<DaemonConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(DaemonError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.expand_env_vars();
        config.validate()?;

        Ok(config)
    }

    fn parse_toml(contents: &str) -> Result<DaemonConfig> {
        toml::from_str(contents)
            .map_err(|e| DaemonError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    fn parse_json(contents: &str) -> Result<DaemonConfig> {
        serde_json::from_str(contents)
            .map_err(|e| DaemonError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if !name.chars().any(|c| c.is_ascii_alphabetic()) {
                return Err(DaemonError::Config(format!(
                    "name must contain at least one ASCII letter: {:?}",
                    name
                )));
            }
        }

        if let Some(pid_file) = &self.pid_file {
            if pid_file.as_os_str().is_empty() {
                return Err(DaemonError::Config("pid_file must not be empty".to_string()));
            }
            if pid_file.is_dir() {
                return Err(DaemonError::Config(format!(
                    "pid_file is a directory: {}",
                    pid_file.display()
                )));
            }
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(DaemonError::Config(format!(
                "Invalid log_level: {}. Must be one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Expand `$VAR` and `${VAR}` in the PID file path
    fn expand_env_vars(&mut self) {
        if let Some(pid_file) = &self.pid_file {
            let expanded = expand_env_in_string(&pid_file.to_string_lossy());
            self.pid_file = Some(PathBuf::from(expanded));
        }
    }
}

/// Substitute `$NAME` and `${NAME}` with the variable's value. The whole name
/// is read before lookup, so `$RUN_DIR` never matches a shorter `$RUN`.
/// Unset variables and malformed tokens are left as written.
fn expand_env_in_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find('$') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let (name, token_len) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) if is_var_name(&braced[..end]) => (&braced[..end], end + 2),
                _ => ("", 0),
            },
            None => {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        match std::env::var(name) {
            Ok(value) if is_var_name(name) => result.push_str(&value),
            _ => result.push_str(&rest[start..start + 1 + token_len]),
        }
        rest = &after[token_len..];
    }

    result.push_str(rest);
    result
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
