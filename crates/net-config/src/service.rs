//! Service configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file, then `EDGE_NETWORK_*` environment variables.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use edge_network_core::ConfigError;

use crate::labels::DEFAULT_LABEL_FILE;

pub const DEFAULT_CONFIG_FILE: &str = "/etc/edge-network/service.toml";
pub const DEFAULT_LISTEN: &str = "unix:///var/run/devicemodel/edge.sock";
pub const ENV_PREFIX: &str = "EDGE_NETWORK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `unix:///path/to.sock` or `tcp://host:port`
    pub listen: String,
    pub label_file: PathBuf,
    /// Flat wait after every apply so NetworkManager can settle.
    pub settle_delay_secs: u64,
    /// Group owning the unix socket; left untouched when unset.
    pub socket_group: Option<u32>,
    pub docker_binary: String,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            label_file: PathBuf::from(DEFAULT_LABEL_FILE),
            settle_delay_secs: 5,
            socket_group: None,
            docker_binary: "docker".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from `path` (or the default location when it
    /// exists) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                builder = builder
                    .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(load_error)?;

        let config: ServiceConfig = settings.try_deserialize().map_err(load_error)?;
        config.listen_address()?;
        Ok(config)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn listen_address(&self) -> Result<ListenAddress, ConfigError> {
        self.listen.parse()
    }
}

fn load_error(err: config::ConfigError) -> ConfigError {
    ConfigError::Load {
        message: err.to_string(),
    }
}

/// Where the API server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAddress {
    Unix(PathBuf),
    Tcp(String),
}

impl FromStr for ListenAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if !path.is_empty() {
                return Ok(ListenAddress::Unix(PathBuf::from(path)));
            }
        } else if let Some(addr) = s.strip_prefix("tcp://") {
            if !addr.is_empty() {
                return Ok(ListenAddress::Tcp(addr.to_string()));
            }
        }
        Err(ConfigError::InvalidValue {
            field: "listen".to_string(),
            value: s.to_string(),
        })
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenAddress::Unix(path) => write!(f, "unix://{}", path.display()),
            ListenAddress::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}
