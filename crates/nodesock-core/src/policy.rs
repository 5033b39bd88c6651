//! Gateway access policy — the runtime counterpart of the resolvers.
//!
//! [`AccessPolicy`] owns the resolved [`OriginSet`] and the server trust state
//! and performs the two checks a socket gateway needs:
//!
//! - [`AccessPolicy::check_client`] before accepting a browser connection.
//! - [`AccessPolicy::check_server_frame`] before accepting a server frame.
//!
//! When the gateway host could not be resolved the policy is built with
//! [`ServerTrust::Untrusted`] and every server frame is rejected.

use std::net::IpAddr;

use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::{AccessError, ResolutionError};
use crate::lookup::HostLookup;
use crate::origin::{resolve_origins, OriginSet};
use crate::servers::{resolve_allowed_servers, AddressAllowList};

/// Outcome of server allow-list resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTrust {
    Trusted(AddressAllowList),
    /// Resolution failed; no address is trusted.
    Untrusted { reason: String },
}

impl ServerTrust {
    pub fn from_resolution(result: Result<AddressAllowList, ResolutionError>) -> Self {
        match result {
            Ok(list) => Self::Trusted(list),
            Err(e) => {
                warn!(error = %e, "server address resolution failed, trusting no servers");
                Self::Untrusted {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Resolved access-control state for one gateway.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    origins: OriginSet,
    servers: ServerTrust,
    check_client_origin: bool,
}

impl AccessPolicy {
    /// Build a policy from `config` and an already computed server
    /// resolution (e.g. from [`crate::DnsResolver::resolve_allowed_servers`]).
    pub fn new(
        config: &GatewayConfig,
        servers: Result<AddressAllowList, ResolutionError>,
    ) -> Self {
        Self {
            origins: resolve_origins(config),
            servers: ServerTrust::from_resolution(servers),
            check_client_origin: config.check_client_origin,
        }
    }

    /// Resolve both sets synchronously through `lookup`.
    pub fn from_lookup<L>(config: &GatewayConfig, lookup: &L) -> Self
    where
        L: HostLookup + ?Sized,
    {
        Self::new(config, resolve_allowed_servers(config, lookup))
    }

    pub fn origins(&self) -> &OriginSet {
        &self.origins
    }

    pub fn servers(&self) -> &ServerTrust {
        &self.servers
    }

    /// The allow-list, or `None` when resolution failed.
    pub fn trusted_servers(&self) -> Option<&AddressAllowList> {
        match &self.servers {
            ServerTrust::Trusted(list) => Some(list),
            ServerTrust::Untrusted { .. } => None,
        }
    }

    pub fn check_client_origin(&self) -> bool {
        self.check_client_origin
    }

    /// Check whether a client presenting `origin` may connect.
    ///
    /// # Errors
    ///
    /// [`AccessError::MissingOrigin`] when origin checking is on and the
    /// client sent none, [`AccessError::OriginNotAllowed`] when the origin
    /// is outside the set.
    pub fn check_client(&self, origin: Option<&str>) -> Result<(), AccessError> {
        check_client_origin(self.check_client_origin, &self.origins, origin)
    }

    /// Check whether `addr` may send server-to-gateway frames.
    ///
    /// # Errors
    ///
    /// [`AccessError::ServersUntrusted`] if resolution failed,
    /// [`AccessError::ServerNotAllowed`] if `addr` is not in the allow-list.
    pub fn check_server_frame(&self, addr: IpAddr) -> Result<(), AccessError> {
        match &self.servers {
            ServerTrust::Untrusted { reason } => {
                debug!(addr = %addr, "server frame rejected, servers untrusted");
                Err(AccessError::ServersUntrusted(reason.clone()))
            }
            ServerTrust::Trusted(list) if list.contains_addr(addr) => Ok(()),
            ServerTrust::Trusted(_) => {
                debug!(addr = %addr, "server frame rejected");
                Err(AccessError::ServerNotAllowed(addr))
            }
        }
    }
}

/// Origin admission shared by [`AccessPolicy`] and callers that only need the
/// origin half (no host lookup).
pub fn check_client_origin(
    enabled: bool,
    origins: &OriginSet,
    origin: Option<&str>,
) -> Result<(), AccessError> {
    if !enabled {
        return Ok(());
    }
    let origin = match origin.map(str::trim) {
        Some(o) if !o.is_empty() => o,
        _ => return Err(AccessError::MissingOrigin),
    };
    if origins.allows(origin) {
        Ok(())
    } else {
        debug!(origin = %origin, "client origin rejected");
        Err(AccessError::OriginNotAllowed(origin.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(host: &str) -> Result<String, ResolutionError> {
        Ok(host.to_string())
    }

    fn failing(host: &str) -> Result<String, ResolutionError> {
        Err(ResolutionError::NoAddress(host.to_string()))
    }

    #[test]
    fn test_client_origin_checked() {
        let cfg = GatewayConfig::new("example.com").with_origin("a.com");
        let policy = AccessPolicy::from_lookup(&cfg, &identity);
        assert!(policy.check_client(Some("http://example.com:3001")).is_ok());
        assert!(policy.check_client(Some("https://a.com")).is_ok());
        assert_eq!(
            policy.check_client(Some("https://evil.com")),
            Err(AccessError::OriginNotAllowed("https://evil.com".to_string()))
        );
        assert_eq!(policy.check_client(None), Err(AccessError::MissingOrigin));
        assert_eq!(policy.check_client(Some("  ")), Err(AccessError::MissingOrigin));
    }

    #[test]
    fn test_origin_check_disabled() {
        let mut cfg = GatewayConfig::new("example.com");
        cfg.check_client_origin = false;
        let policy = AccessPolicy::from_lookup(&cfg, &identity);
        assert!(policy.check_client(Some("https://evil.com")).is_ok());
        assert!(policy.check_client(None).is_ok());
    }

    #[test]
    fn test_server_frames() {
        let cfg = GatewayConfig::new("10.0.0.1").with_allowed_servers("10.0.0.2");
        let policy = AccessPolicy::from_lookup(&cfg, &identity);
        assert!(policy.check_server_frame("10.0.0.1".parse().unwrap()).is_ok());
        assert!(policy.check_server_frame("10.0.0.2".parse().unwrap()).is_ok());
        assert!(matches!(
            policy.check_server_frame("10.0.0.3".parse().unwrap()),
            Err(AccessError::ServerNotAllowed(_))
        ));
    }

    #[test]
    fn test_failed_resolution_trusts_nothing() {
        let cfg = GatewayConfig::new("gone.invalid").with_allowed_servers("10.0.0.2");
        let policy = AccessPolicy::from_lookup(&cfg, &failing);
        assert!(policy.trusted_servers().is_none());
        assert!(matches!(
            policy.check_server_frame("10.0.0.2".parse().unwrap()),
            Err(AccessError::ServersUntrusted(_))
        ));
        // Origins are unaffected by server resolution.
        assert!(policy.check_client(Some("http://gone.invalid")).is_ok());
    }
}
