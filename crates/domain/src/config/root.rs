use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::querier::QuerierConfig;
use super::resolver::ResolverConfig;
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub querier: QuerierConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<Transport>,
    pub local_address: Option<String>,
    pub per_key_capacity: Option<u16>,
    pub query_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    /// Loads the file when a path is given, otherwise starts from defaults,
    /// then applies `overrides`.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
                        path: path.to_string(),
                        message: e.to_string(),
                    })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(server) = overrides.server {
            self.resolver.server = server;
        }
        if let Some(port) = overrides.port {
            self.resolver.port = port;
        }
        if let Some(transport) = overrides.transport {
            self.resolver.transport = transport;
        }
        if let Some(local) = overrides.local_address {
            self.resolver.local_address = local;
        }
        if let Some(capacity) = overrides.per_key_capacity {
            self.querier.per_key_capacity = capacity;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.querier.query_timeout_ms = timeout;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.querier.per_key_capacity == 0 {
            return Err(ConfigError::Validation(
                "querier.per_key_capacity must be at least 1".into(),
            ));
        }
        if self.querier.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "querier.query_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.resolver.server.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "resolver.server '{}' is not an IP address",
                self.resolver.server
            )));
        }
        self.local_address()?;
        Ok(())
    }

    pub fn local_address(&self) -> Result<IpAddr, ConfigError> {
        self.resolver.local_address.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "resolver.local_address '{}' is not an IP address",
                self.resolver.local_address
            ))
        })
    }
}
