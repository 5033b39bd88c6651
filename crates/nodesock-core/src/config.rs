//! Gateway configuration as seen by the access resolvers.
//!
//! Fields that historically accepted "a comma separated string or a list"
//! are modelled as [`StringOrList`] and normalized through
//! [`StringOrList::entries`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A configuration value given either as one comma-separated string or as a
/// list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    Single(String),
    List(Vec<String>),
}

impl StringOrList {
    /// Raw entries: comma-split for `Single`, as-is for `List`. Not trimmed.
    pub fn split_entries(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => s.split(',').collect(),
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Trimmed, non-empty entries in configuration order.
    pub fn entries(&self) -> Vec<&str> {
        self.split_entries()
            .into_iter()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// `true` when no non-blank entry is present.
    pub fn is_blank(&self) -> bool {
        self.entries().is_empty()
    }
}

impl From<&str> for StringOrList {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for StringOrList {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for StringOrList {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Connection settings of the socket gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// IP address or bare domain name, never with a scheme.
    #[serde(default = "default_host")]
    pub host: String,
    /// Gateway port. Informational for resolution.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Extra origins allowed to open a socket connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<StringOrList>,
    /// Extra addresses allowed to send server frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_server_addresses: Option<StringOrList>,
    /// When `false`, any client may connect regardless of its origin.
    #[serde(default = "default_true")]
    pub check_client_origin: bool,
    /// Handshake timeout handed to the gateway process, in milliseconds.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Upper bound on the host lookup, in milliseconds.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            origin: None,
            allowed_server_addresses: None,
            check_client_origin: true,
            handshake_timeout_ms: default_handshake_timeout_ms(),
            resolve_timeout_ms: default_resolve_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3001
}
fn default_true() -> bool {
    true
}
fn default_handshake_timeout_ms() -> u64 {
    2000
}
fn default_resolve_timeout_ms() -> u64 {
    3000
}

impl GatewayConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_origin(mut self, origin: impl Into<StringOrList>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_allowed_servers(mut self, servers: impl Into<StringOrList>) -> Self {
        self.allowed_server_addresses = Some(servers.into());
        self
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if host.contains("://") {
            return Err(ConfigError::Invalid(format!(
                "host must not contain a scheme: {host}"
            )));
        }
        if host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "host must be an IP address or bare domain: {host}"
            )));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be > 0".to_string()));
        }
        if self.resolve_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "resolve_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
