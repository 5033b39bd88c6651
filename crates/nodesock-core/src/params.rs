//! Access parameters handed to the external socket gateway process.

use serde::Serialize;

use crate::config::GatewayConfig;
use crate::error::AccessError;
use crate::origin::OriginSet;
use crate::policy::{AccessPolicy, ServerTrust};
use crate::servers::AddressAllowList;

/// Path of the socket.io browser client served by the gateway.
pub const CLIENT_SCRIPT_PATH: &str = "/socket.io/socket.io.js";

/// URL browsers load the socket.io client script from.
pub fn client_script_url(host: &str, port: u16) -> String {
    format!("http://{}:{}{}", host, port, CLIENT_SCRIPT_PATH)
}

/// Effective connection/authorization parameters, serialized as camelCase
/// JSON for the gateway process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessParameters {
    pub host: String,
    pub port: u16,
    /// Space-joined origin field.
    pub origin: String,
    pub origins: Vec<String>,
    pub allowed_servers: Vec<String>,
    pub check_client_origin: bool,
    /// Milliseconds.
    pub handshake_timeout: u64,
    pub client_script_url: String,
}

impl AccessParameters {
    pub fn build(
        config: &GatewayConfig,
        origins: &OriginSet,
        servers: &AddressAllowList,
    ) -> Self {
        let host = config.host.trim().to_string();
        Self {
            client_script_url: client_script_url(&host, config.port),
            host,
            port: config.port,
            origin: origins.to_field_value(),
            origins: origins.to_vec(),
            allowed_servers: servers.to_vec(),
            check_client_origin: config.check_client_origin,
            handshake_timeout: config.handshake_timeout_ms,
        }
    }

    /// Parameters for a resolved policy.
    ///
    /// # Errors
    ///
    /// [`AccessError::ServersUntrusted`] if the policy's server resolution
    /// failed. No parameters are produced in that case, so no server list
    /// can be published.
    pub fn from_policy(config: &GatewayConfig, policy: &AccessPolicy) -> Result<Self, AccessError> {
        match policy.servers() {
            ServerTrust::Trusted(list) => Ok(Self::build(config, policy.origins(), list)),
            ServerTrust::Untrusted { reason } => Err(AccessError::ServersUntrusted(reason.clone())),
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
