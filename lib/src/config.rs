// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{path::Path, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use lockbox_core::{card::Key, engine};

use crate::Error;

/// Default access service base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default access service request timeout
pub const DEFAULT_TIMEOUT_S: u64 = 10;

/// Host configuration, loaded from TOML
///
/// ```toml
/// [service]
/// base_url = "https://lockbox.example.com"
/// username = "lockbox"
/// password = "..."
/// timeout_s = 10
///
/// [card]
/// device_key = "a0a1a2a3a4a5"
///
/// [timing]
/// network_timeout_ms = 15000
/// ```
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Access service connection
    pub service: ServiceConfig,

    /// Card protocol keys
    pub card: CardConfig,

    /// Engine timing
    pub timing: engine::Config,
}

/// Access service connection configuration
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service base URL, endpoint paths are appended to this
    pub base_url: String,

    /// HTTP Basic username
    pub username: String,

    /// HTTP Basic password
    pub password: String,

    /// Request timeout in seconds
    pub timeout_s: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: String::new(),
            password: String::new(),
            timeout_s: DEFAULT_TIMEOUT_S,
        }
    }
}

/// Card protocol configuration
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Device key (6 bytes, hex encoded)
    pub device_key: Option<String>,
}

impl CardConfig {
    /// Parse the configured device key
    pub fn device_key(&self) -> Result<Key, Error> {
        self.device_key
            .as_deref()
            .ok_or(Error::InvalidKey)
            .and_then(|k| Key::from_str(k).map_err(|_| Error::InvalidKey))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        debug!("Loading configuration from '{}'", path.as_ref().display());

        let s = std::fs::read_to_string(path)?;
        s.parse()
    }

    /// Copy of this configuration with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut c = self.clone();

        if !c.service.password.is_empty() {
            c.service.password = "********".to_string();
        }
        if c.card.device_key.is_some() {
            c.card.device_key = Some("************".to_string());
        }

        c
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = toml::from_str(s)?;
        Ok(c)
    }
}
