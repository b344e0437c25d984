//! Render server connection settings
//!
//! Loaded from TOML by the host; every field has a default so an empty file
//! is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::network::protocol::{CONNECT_TIMEOUT, DEFAULT_SERVER_PORT};

/// Connection configuration for one render session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or IP address of the render server
    pub address: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    /// Socket read timeout, none blocks forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_timeout_ms: Option<u64>,
    /// Disable Nagle's algorithm
    pub nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: DEFAULT_SERVER_PORT,
            connect_timeout_ms: CONNECT_TIMEOUT.as_millis() as u64,
            read_timeout_ms: None,
            write_timeout_ms: None,
            nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> BridgeResult<Self> {
        toml::from_str(text).map_err(|e| BridgeError::Config {
            path: "<inline>".to_string(),
            error: e.to_string(),
        })
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BridgeError::Config {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| BridgeError::Config {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        log::debug!("Loaded render server config from {}", path.display());
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> BridgeResult<String> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::Config {
            path: "<inline>".to_string(),
            error: e.to_string(),
        })
    }

    /// `host:port` form used for resolution
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
    }
}
