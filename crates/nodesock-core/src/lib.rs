//! nodesock-core: access parameter resolution for socket gateways.
//!
//! Derives the origins allowed to open a socket connection and the server
//! addresses allowed to send server frames, and enforces both through an
//! [`AccessPolicy`] that fails closed when the gateway host cannot be
//! resolved.

pub mod config;
pub mod error;
pub mod lookup;
pub mod origin;
pub mod params;
pub mod policy;
pub mod servers;

// Re-export commonly used items at crate root.
pub use config::{GatewayConfig, StringOrList};
pub use error::{AccessError, ConfigError, ResolutionError};
pub use lookup::{DnsResolver, HostLookup};
pub use origin::{resolve_origins, OriginSet};
pub use params::{client_script_url, AccessParameters};
pub use policy::{AccessPolicy, ServerTrust};
pub use servers::{resolve_allowed_servers, AddressAllowList};
