//! `nodesock resolve` — print the effective access parameters as JSON.
//!
//! Resolves the gateway host once, builds the [`AccessPolicy`] and writes the
//! [`AccessParameters`] document to stdout for the gateway process. When the
//! host cannot be resolved nothing is printed and the command fails.

use anyhow::{Context, Result};
use nodesock_core::{AccessParameters, AccessPolicy, DnsResolver, GatewayConfig};
use tracing::info;

pub async fn run(config: &GatewayConfig, pretty: bool) -> Result<()> {
    let servers = DnsResolver::from_config(config)
        .resolve_allowed_servers(config)
        .await;
    let policy = AccessPolicy::new(config, servers);

    let params = AccessParameters::from_policy(config, &policy)
        .context("refusing to publish access parameters")?;
    info!(
        host = %params.host,
        origins = params.origins.len(),
        servers = params.allowed_servers.len(),
        "resolved access parameters"
    );

    let json = params
        .to_json(pretty)
        .context("failed to serialize access parameters")?;
    println!("{json}");
    Ok(())
}
