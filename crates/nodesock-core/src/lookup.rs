//! Host-to-IP lookup — the only externally delegated step of resolution.
//!
//! [`HostLookup`] is the synchronous seam used by
//! [`crate::servers::resolve_allowed_servers`]; any
//! `Fn(&str) -> Result<String, ResolutionError>` implements it, so tests can
//! inject fakes. [`DnsResolver`] is the async production lookup built on
//! `tokio::net::lookup_host`.

use std::net::IpAddr;
use std::time::Duration;

use tokio::{net, time};
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::ResolutionError;
use crate::servers::{build_allow_list, AddressAllowList};

/// Resolves a gateway host to a single IP address string.
pub trait HostLookup {
    fn lookup(&self, host: &str) -> Result<String, ResolutionError>;
}

impl<F> HostLookup for F
where
    F: Fn(&str) -> Result<String, ResolutionError>,
{
    fn lookup(&self, host: &str) -> Result<String, ResolutionError> {
        self(host)
    }
}

/// Async DNS resolver with a bounded timeout.
///
/// The resolver does not cache; callers that resolve frequently should keep
/// the resulting [`AddressAllowList`] themselves.
#[derive(Debug, Clone, Copy)]
pub struct DnsResolver {
    timeout: Duration,
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3000),
        }
    }
}

impl DnsResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Resolver using the config's `resolve_timeout_ms`.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.resolve_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `host` to one IP address.
    ///
    /// IP literals are returned as-is without a query. Otherwise IPv4 results
    /// are preferred and the first IPv6 result is used only when no IPv4
    /// record exists. A dummy port (`:0`) is appended internally because
    /// `lookup_host` requires a `host:port` pair.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::Lookup`] if the system resolver fails,
    /// [`ResolutionError::NoAddress`] if it returns nothing, and
    /// [`ResolutionError::Timeout`] if it exceeds the configured timeout.
    pub async fn resolve_host(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        let host = host.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            debug!(host = %host, "host is an IP literal, skipping DNS");
            return Ok(ip);
        }

        let lookup_addr = format!("{}:0", host);
        let addrs = match time::timeout(self.timeout, net::lookup_host(&lookup_addr)).await {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => {
                warn!(host = %host, error = %e, "DNS resolution failed");
                return Err(ResolutionError::Lookup {
                    host: host.to_string(),
                    source: e,
                });
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(host = %host, timeout_ms, "DNS resolution timed out");
                return Err(ResolutionError::Timeout {
                    host: host.to_string(),
                    timeout_ms,
                });
            }
        };

        let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        let chosen = ips
            .iter()
            .copied()
            .find(IpAddr::is_ipv4)
            .or_else(|| ips.first().copied());

        match chosen {
            Some(ip) => {
                debug!(host = %host, ip = %ip, candidates = ips.len(), "resolved");
                Ok(ip)
            }
            None => {
                debug!(host = %host, "no matching addresses found");
                Err(ResolutionError::NoAddress(host.to_string()))
            }
        }
    }

    /// Async counterpart of [`crate::servers::resolve_allowed_servers`].
    pub async fn resolve_allowed_servers(
        &self,
        config: &GatewayConfig,
    ) -> Result<AddressAllowList, ResolutionError> {
        let ip = self.resolve_host(&config.host).await?;
        Ok(build_allow_list(ip.to_string(), config))
    }
}
