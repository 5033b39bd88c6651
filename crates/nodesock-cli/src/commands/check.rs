//! `nodesock check-origin` / `nodesock check-server` — one-off access checks.
//!
//! Both print `allowed` or `denied` and return the verdict so `main` can map
//! it to the exit status.

use std::net::IpAddr;

use anyhow::Result;
use nodesock_core::{policy, resolve_origins, AccessPolicy, DnsResolver, GatewayConfig};

/// Check a browser origin. Needs no host lookup.
pub fn run_origin(config: &GatewayConfig, origin: &str) -> Result<bool> {
    let origins = resolve_origins(config);
    let verdict = policy::check_client_origin(config.check_client_origin, &origins, Some(origin));
    Ok(report(verdict))
}

/// Check a server frame sender. Resolution failure means `denied`.
pub async fn run_server(config: &GatewayConfig, addr: IpAddr) -> Result<bool> {
    let servers = DnsResolver::from_config(config)
        .resolve_allowed_servers(config)
        .await;
    let policy = AccessPolicy::new(config, servers);
    Ok(report(policy.check_server_frame(addr)))
}

fn report(verdict: Result<(), nodesock_core::AccessError>) -> bool {
    match verdict {
        Ok(()) => {
            println!("allowed");
            true
        }
        Err(e) => {
            println!("denied");
            eprintln!("{e}");
            false
        }
    }
}
