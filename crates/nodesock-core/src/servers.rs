//! Server allow-list resolution — which addresses may send server frames.

use std::collections::BTreeSet;
use std::net::IpAddr;

use serde::Serialize;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::ResolutionError;
use crate::lookup::HostLookup;

/// Deduplicated set of addresses trusted to send server-to-gateway frames.
///
/// Always contains the resolved address of the gateway host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressAllowList {
    addresses: BTreeSet<String>,
}

impl AddressAllowList {
    fn insert(&mut self, address: &str) -> bool {
        let address = address.trim();
        !address.is_empty() && self.addresses.insert(address.to_string())
    }

    /// Exact string membership.
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address.trim())
    }

    /// Address membership, treating IPv4-mapped IPv6 senders as their IPv4
    /// form. Entries that are not IP literals never match.
    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        let addr = canonical(addr);
        self.addresses
            .iter()
            .filter_map(|entry| entry.parse::<IpAddr>().ok())
            .any(|entry| canonical(entry) == addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.addresses.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.addresses.iter().cloned().collect()
    }
}

fn canonical(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(addr),
        IpAddr::V4(_) => addr,
    }
}

/// Resolve the addresses allowed to send server frames for `config`.
///
/// The host is looked up exactly once through `lookup`. A lookup failure, or
/// a blank lookup result, is returned as an error; no partial list is ever
/// produced.
pub fn resolve_allowed_servers<L>(
    config: &GatewayConfig,
    lookup: &L,
) -> Result<AddressAllowList, ResolutionError>
where
    L: HostLookup + ?Sized,
{
    let host = config.host.trim();
    let resolved = lookup.lookup(host)?;
    let resolved = resolved.trim();
    if resolved.is_empty() {
        return Err(ResolutionError::NoAddress(host.to_string()));
    }
    Ok(build_allow_list(resolved.to_string(), config))
}

/// Seed with the resolved host address, then merge the configured entries.
pub(crate) fn build_allow_list(resolved: String, config: &GatewayConfig) -> AddressAllowList {
    let mut list = AddressAllowList::default();
    list.insert(&resolved);
    if let Some(extra) = &config.allowed_server_addresses {
        for entry in extra.entries() {
            list.insert(entry);
        }
    }
    debug!(
        host = %config.host,
        resolved = %resolved,
        count = list.len(),
        "resolved allowed server addresses"
    );
    list
}
