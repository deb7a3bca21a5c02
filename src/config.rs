//! Configuration management for shell-mirror.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::error::ShellMirrorError;
use crate::pty::{PtySize, SpawnOptions};
use crate::terminal::{BoundaryPolicy, TerminalConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Shell process configuration.
    pub shell: ShellSection,
    /// Screen and raw log capacities.
    pub terminal: TerminalConfig,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Shell configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Shell program; `$SHELL` (or the platform default) when unset.
    pub program: Option<String>,
    /// Starting directory; the user's home when unset.
    pub working_dir: Option<PathBuf>,
    pub cols: u16,
    pub rows: u16,
}

impl Default for ShellSection {
    fn default() -> Self {
        let size = PtySize::default();
        Self {
            program: None,
            working_dir: None,
            cols: size.cols,
            rows: size.rows,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("SHELL_MIRROR_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("SHELL_MIRROR_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(shell) = var("SHELL_MIRROR_SHELL").filter(|s| !s.is_empty()) {
            self.shell.program = Some(shell);
        }

        if let Some(lines) = var("SHELL_MIRROR_MAX_LINES").and_then(|n| n.parse().ok()) {
            self.terminal.max_lines = lines;
        }

        if let Some(level) = var("SHELL_MIRROR_LOG_LEVEL").or_else(|| var("RUST_LOG")) {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref shell) = args.shell {
            self.shell.program = Some(shell.clone());
        }
        if let Some(lines) = args.max_lines {
            self.terminal.max_lines = lines;
        }
        if let Some(chunks) = args.max_buffer {
            self.terminal.max_buffer_size = chunks;
        }
        if args.discard_partial {
            self.terminal.boundary_policy = BoundaryPolicy::Discard;
        }
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Check values that would only fail later, at bind or spawn time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .host
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;
        self.terminal.validate().map_err(|e| match e {
            ShellMirrorError::InvalidConfig(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        })?;
        if self.shell.cols == 0 || self.shell.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "shell size must be non-zero, got {}x{}",
                self.shell.cols, self.shell.rows
            )));
        }
        Ok(())
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;
        Ok(ServerConfig::new(host.to_string(), self.server.port))
    }

    /// Options for launching the shell.
    pub fn to_spawn_options(&self) -> SpawnOptions {
        SpawnOptions {
            shell: self.shell.program.clone(),
            working_dir: self.shell.working_dir.clone(),
            size: PtySize::new(self.shell.rows, self.shell.cols),
            ..SpawnOptions::default()
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// A value outside its allowed range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.shell.cols, 80);
        assert_eq!(config.shell.rows, 30);
        assert_eq!(config.terminal.max_lines, 1000);
        assert_eq!(config.terminal.max_buffer_size, 1000);
        assert_eq!(config.terminal.boundary_policy, BoundaryPolicy::Carry);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "server": {
                "host": "0.0.0.0",
                "port": 8080
            },
            "shell": {
                "program": "/bin/bash",
                "cols": 120
            },
            "terminal": {
                "max_lines": 200,
                "boundary_policy": "discard"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.shell.program.as_deref(), Some("/bin/bash"));
        assert_eq!(config.shell.cols, 120);
        assert_eq!(config.shell.rows, 30);
        assert_eq!(config.terminal.max_lines, 200);
        assert_eq!(config.terminal.max_buffer_size, 1000);
        assert_eq!(config.terminal.boundary_policy, BoundaryPolicy::Discard);
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{
            "server": {
                "port": 9000
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1"); // Default
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_config_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config.apply_env_from(env_of(&[
            ("SHELL_MIRROR_HOST", "0.0.0.0"),
            ("SHELL_MIRROR_PORT", "4000"),
            ("SHELL_MIRROR_SHELL", "/bin/zsh"),
            ("SHELL_MIRROR_MAX_LINES", "50"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.shell.program.as_deref(), Some("/bin/zsh"));
        assert_eq!(config.terminal.max_lines, 50);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_apply_env_ignores_bad_numbers() {
        let mut config = Config::default();
        config.apply_env_from(env_of(&[
            ("SHELL_MIRROR_PORT", "not-a-port"),
            ("SHELL_MIRROR_MAX_LINES", "-3"),
        ]));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.terminal.max_lines, 1000);
    }

    #[test]
    fn test_log_level_env_precedence() {
        let mut config = Config::default();
        config.apply_env_from(env_of(&[
            ("SHELL_MIRROR_LOG_LEVEL", "warn"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            host: Some("192.168.1.1".parse().unwrap()),
            port: Some(5000),
            shell: Some("/bin/bash".to_string()),
            max_lines: Some(10),
            max_buffer: Some(5),
            discard_partial: true,
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.shell.program.as_deref(), Some("/bin/bash"));
        assert_eq!(config.terminal.max_lines, 10);
        assert_eq!(config.terminal.max_buffer_size, 5);
        assert_eq!(config.terminal.boundary_policy, BoundaryPolicy::Discard);
    }

    #[test]
    fn test_args_override_env() {
        let mut config = Config::default();
        config.apply_env_from(env_of(&[("SHELL_MIRROR_PORT", "4000")]));
        config.apply_args(&Args {
            port: Some(5000),
            ..Args::default()
        });
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_unset_args_keep_file_values() {
        let mut config = Config::default();
        config.server.port = 7000;
        config.apply_args(&Args::default());
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn test_to_server_config() {
        let config = Config::default();
        let server_config = config.to_server_config().unwrap();

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 3000);
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();

        assert!(config.to_server_config().is_err());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHost(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.terminal.max_lines = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.shell.cols = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_to_spawn_options() {
        let mut config = Config::default();
        config.shell.program = Some("/bin/sh".into());
        config.shell.cols = 100;
        config.shell.rows = 40;

        let options = config.to_spawn_options();
        assert_eq!(options.shell.as_deref(), Some("/bin/sh"));
        assert_eq!(options.size, PtySize::new(40, 100));
        assert!(options.working_dir.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"host\""));
        assert!(json.contains("\"port\""));
        assert!(json.contains("\"boundary_policy\": \"carry\""));
    }
}
