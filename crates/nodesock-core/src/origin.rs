//! Origin resolution — which browser origins may open a socket connection.
//!
//! The resolved set always starts with the default `"<host>:*"` entry,
//! followed by the configured origins in configuration order.
//!
//! # Entry Matching
//!
//! | Entry             | Matches                                  |
//! |-------------------|------------------------------------------|
//! | `"*:*"`           | Any host and port.                       |
//! | `"*:8080"`        | Any host on port 8080.                   |
//! | `"example.com:*"` | The exact hostname on **any** port.      |
//! | `"example.com"`   | The exact hostname on **any** port.      |
//! | `"example.com:80"`| The exact hostname **and** port pair.    |

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::GatewayConfig;

/// Wildcard used for host or port in an origin entry.
pub const WILDCARD: &str = "*";

/// The origin entry always allowed for a gateway host.
pub fn default_origin(host: &str) -> String {
    format!("{host}:{WILDCARD}")
}

/// Ordered, deduplicated set of allowed origins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OriginSet {
    entries: Vec<String>,
}

impl OriginSet {
    fn with_default(host: &str) -> Self {
        Self {
            entries: vec![default_origin(host)],
        }
    }

    fn insert(&mut self, entry: &str) -> bool {
        if entry.is_empty() || self.contains(entry) {
            return false;
        }
        self.entries.push(entry.to_string());
        true
    }

    /// Membership ignoring ASCII case, matching how [`OriginSet::allows`]
    /// compares hosts.
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e.eq_ignore_ascii_case(entry))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a resolved set; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Space-joined form used by the gateway's `origins` field.
    pub fn to_field_value(&self) -> String {
        self.entries.join(" ")
    }

    /// Whether a client presenting `request_origin` may connect.
    ///
    /// `request_origin` is the value of a browser `Origin` header, with or
    /// without scheme (`http://a.com:8080` or `a.com:8080`). When the port
    /// is absent it is derived from the scheme.
    pub fn allows(&self, request_origin: &str) -> bool {
        let Some((host, port)) = split_origin(request_origin) else {
            return false;
        };
        self.entries
            .iter()
            .any(|entry| entry_matches(entry, &host, port.as_deref()))
    }
}

impl fmt::Display for OriginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field_value())
    }
}

/// Resolve the origins allowed to connect to the gateway described by `config`.
///
/// Never fails: a missing or malformed `origin` value degrades to the
/// default entry alone.
pub fn resolve_origins(config: &GatewayConfig) -> OriginSet {
    let mut set = OriginSet::with_default(config.host.trim());
    if let Some(origin) = &config.origin {
        for entry in origin.entries() {
            if !set.insert(entry) {
                debug!(entry = %entry, "duplicate origin entry ignored");
            }
        }
    }
    debug!(host = %config.host, count = set.len(), origins = %set, "resolved origins");
    set
}

fn entry_matches(entry: &str, host: &str, port: Option<&str>) -> bool {
    let Some((entry_host, entry_port)) = split_origin(entry) else {
        return false;
    };
    let host_ok = entry_host == WILDCARD || entry_host == host;
    let port_ok = match entry_port.as_deref() {
        None | Some(WILDCARD) => true,
        Some(p) => port == Some(p),
    };
    host_ok && port_ok
}

/// Split an origin into a lowercase host and an optional port.
fn split_origin(origin: &str) -> Option<(String, Option<String>)> {
    let origin = origin.trim();
    let (scheme, rest) = match origin.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_ascii_lowercase()), rest),
        None => (None, origin),
    };
    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = split_host_port(authority);
    if host.is_empty() {
        return None;
    }
    let port = match port {
        Some(p) => Some(p.to_string()),
        None => scheme
            .as_deref()
            .and_then(scheme_port)
            .map(|p| p.to_string()),
    };
    Some((host.to_ascii_lowercase(), port))
}

fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    if let Some(rest) = authority.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, tail)) => (host, tail.strip_prefix(':').filter(|p| !p.is_empty())),
            None => (authority, None),
        };
    }
    match authority.rsplit_once(':') {
        // Unbracketed IPv6 literal: no port.
        Some((host, _)) if host.contains(':') => (authority, None),
        Some((host, port)) if !port.is_empty() => (host, Some(port)),
        Some((host, _)) => (host, None),
        None => (authority, None),
    }
}

fn scheme_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    }
}
