//! Client configuration file

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Standard RADIUS authentication port
pub const RADIUS_AUTH_PORT: u16 = 1812;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Client session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// RADIUS server host name or IP address
    #[serde(default = "default_server")]
    pub server: String,

    /// RADIUS server authentication port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret
    pub secret: String,

    /// Retransmission policy
    #[serde(default)]
    pub retry: RetryPolicy,

    /// NAS-Identifier sent with every request (optional)
    #[serde(default)]
    pub nas_identifier: Option<String>,

    /// NAS-IP-Address sent with every request (optional)
    #[serde(default)]
    pub nas_ip_address: Option<Ipv4Addr>,

    /// Sign every Access-Request with a Message-Authenticator
    #[serde(default)]
    pub message_authenticator: bool,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_server() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    RADIUS_AUTH_PORT
}

impl ClientConfig {
    pub fn new(server: impl Into<String>, port: u16, secret: impl Into<String>) -> Self {
        ClientConfig {
            server: server.into(),
            port,
            secret: secret.into(),
            retry: RetryPolicy::default(),
            nas_identifier: None,
            nas_ip_address: None,
            message_authenticator: false,
            log_level: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid("server cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid("port cannot be 0".to_string()));
        }

        if self.secret.is_empty() {
            return Err(ConfigError::Invalid(
                "shared secret cannot be empty".to_string(),
            ));
        }

        if self.retry.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "retry timeout cannot be 0".to_string(),
            ));
        }

        if let Some(ref nas_id) = self.nas_identifier
            && (nas_id.is_empty() || nas_id.len() > 253)
        {
            return Err(ConfigError::Invalid(format!(
                "NAS-Identifier must be 1-253 bytes, got {}",
                nas_id.len()
            )));
        }

        Ok(())
    }

    /// Resolve `server:port`, accepting literal addresses or host names
    pub async fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        if let Ok(ip) = self.server.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        tokio::net::lookup_host((self.server.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                ConfigError::Invalid(format!("server '{}' did not resolve", self.server))
            })
    }
}
