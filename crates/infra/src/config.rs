//! Configuration loading and representation.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DATA_FILE_VAR: &str = "STOCKBOOK_DATA_FILE";
pub const BIND_ADDR_VAR: &str = "STOCKBOOK_BIND_ADDR";

const DEFAULT_DATA_FILE: &str = "data/history.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Process configuration, passed explicitly to the service at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Location of the JSON log document.
    pub data_file: PathBuf,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl LedgerConfig {
    /// Read `STOCKBOOK_DATA_FILE` and `STOCKBOOK_BIND_ADDR`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = lookup(DATA_FILE_VAR).unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        if data_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: DATA_FILE_VAR,
                message: "path cannot be empty".to_string(),
            });
        }

        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.trim().parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                var: BIND_ADDR_VAR,
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            data_file: PathBuf::from(data_file),
            bind_addr,
        })
    }

    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }
}
