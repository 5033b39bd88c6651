use std::net::IpAddr;

use thiserror::Error;

/// Failure to turn the configured gateway host into an IP address.
///
/// Callers must treat this as "trust no server address".
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("DNS resolution failed for {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no address records found for {0}")]
    NoAddress(String),

    #[error("DNS resolution for {host} timed out after {timeout_ms}ms")]
    Timeout { host: String, timeout_ms: u64 },
}

/// Rejections produced by [`crate::AccessPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("client did not present an origin")]
    MissingOrigin,

    #[error("origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("server address not allowed: {0}")]
    ServerNotAllowed(IpAddr),

    #[error("server addresses are untrusted: {0}")]
    ServersUntrusted(String),
}

/// Invalid gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
