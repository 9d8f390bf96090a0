//! Server configuration parameters.
//!
//! All tunables for the breakerd service.  Values come from
//! [`ServerConfig::default`], optionally replaced by a JSON file, and
//! finally overridden by command-line flags.  Every path into the server
//! goes through [`ServerConfig::validate`].

use core::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::protocol::parser::ParseMode;
use crate::registers::RegisterDefaults;

/// Default TCP listen port.
pub const DEFAULT_PORT: u16 = 2222;

/// Default credential file, relative to the working directory.
pub const DEFAULT_CREDENTIALS_PATH: &str = "./passwd";

/// Longest accepted command line, in bytes.
pub const DEFAULT_MAX_LINE_LEN: usize = 8000;

/// Core server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    // --- Listener ---
    /// Address to bind
    pub bind_addr: IpAddr,
    /// TCP port (0 lets the OS pick one)
    pub listen_port: u16,
    /// Concurrent sessions; 1 reproduces the one-client-at-a-time server
    pub max_sessions: usize,
    /// Idle read timeout per session in seconds (`None` waits forever)
    pub read_timeout_secs: Option<u64>,
    /// Stop accepting connections after an authorized `exit`
    pub exit_stops_server: bool,

    // --- Protocol ---
    /// Longest accepted line in bytes
    pub max_line_len: usize,
    /// How unparsable numeric tokens are treated
    pub parse_mode: ParseMode,
    /// Report unknown user and bad password with one generic message
    pub collapse_auth_errors: bool,

    // --- Credentials ---
    /// `<user> <password> <level>` file, re-read on every lookup
    pub credentials_path: PathBuf,

    // --- Hardware ---
    /// Power-on register values
    pub initial_registers: RegisterDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: DEFAULT_PORT,
            max_sessions: 8,
            read_timeout_secs: Some(300),
            exit_stops_server: true,

            max_line_len: DEFAULT_MAX_LINE_LEN,
            parse_mode: ParseMode::Legacy,
            collapse_auth_errors: false,

            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),

            initial_registers: RegisterDefaults::default(),
        }
    }
}

impl ServerConfig {
    /// Load a configuration file.  Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sessions == 0 {
            return Err(ConfigError::ValidationFailed("max_sessions must be at least 1"));
        }
        if self.max_line_len < 16 {
            return Err(ConfigError::ValidationFailed("max_line_len must be at least 16"));
        }
        if self.read_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "read_timeout_secs must be positive or null",
            ));
        }
        if self.credentials_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("credentials_path must not be empty"));
        }
        Ok(())
    }

    /// Socket address the listener binds.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.listen_port)
    }
}

/// Errors from loading or validating a [`ServerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file does not exist.
    NotFound,
    /// The file is not valid JSON for this schema.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// The file exists but could not be read.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
