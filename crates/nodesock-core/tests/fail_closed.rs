//! Caller-level checks: a gateway that cannot resolve its own host must not
//! trust any server address.

use std::net::IpAddr;

use nodesock_core::{
    resolve_allowed_servers, AccessError, AccessParameters, AccessPolicy, DnsResolver,
    GatewayConfig, ResolutionError,
};

fn dns_down(host: &str) -> Result<String, ResolutionError> {
    Err(ResolutionError::Lookup {
        host: host.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, "resolver unreachable"),
    })
}

fn candidates() -> Vec<IpAddr> {
    ["10.0.0.1", "10.0.0.2", "10.0.0.3", "127.0.0.1", "::1"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect()
}

#[test]
fn resolver_error_is_surfaced() {
    let cfg = GatewayConfig::new("gateway.example").with_allowed_servers("10.0.0.2,10.0.0.3");
    let err = resolve_allowed_servers(&cfg, &dns_down).unwrap_err();
    assert!(matches!(err, ResolutionError::Lookup { .. }));
    assert!(err.to_string().contains("gateway.example"));
}

#[test]
fn no_address_trusted_after_resolver_failure() {
    let cfg = GatewayConfig::new("gateway.example").with_allowed_servers("10.0.0.2,10.0.0.3");
    let policy = AccessPolicy::from_lookup(&cfg, &dns_down);

    for addr in candidates() {
        assert!(
            matches!(
                policy.check_server_frame(addr),
                Err(AccessError::ServersUntrusted(_))
            ),
            "{addr} must not be trusted"
        );
    }
    assert!(AccessParameters::from_policy(&cfg, &policy).is_err());
}

#[test]
fn configured_servers_trusted_after_successful_resolution() {
    let cfg = GatewayConfig::new("gateway.example").with_allowed_servers("10.0.0.2,10.0.0.3");
    let lookup = |_: &str| -> Result<String, ResolutionError> { Ok("10.0.0.1".to_string()) };
    let policy = AccessPolicy::from_lookup(&cfg, &lookup);

    let trusted: Vec<IpAddr> = candidates()
        .into_iter()
        .filter(|addr| policy.check_server_frame(*addr).is_ok())
        .collect();
    let expected: Vec<IpAddr> = ["10.0.0.1", "10.0.0.2", "10.0.0.3"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(trusted, expected);
}

#[tokio::test]
async fn dns_failure_trusts_nothing() {
    let mut cfg = GatewayConfig::new("nodesock.host.does.not.exist.invalid")
        .with_allowed_servers("10.0.0.2");
    cfg.resolve_timeout_ms = 2000;
    let servers = DnsResolver::from_config(&cfg).resolve_allowed_servers(&cfg).await;
    assert!(servers.is_err());

    let policy = AccessPolicy::new(&cfg, servers);
    assert!(policy.trusted_servers().is_none());
    assert!(policy
        .check_server_frame("10.0.0.2".parse().unwrap())
        .is_err());
}
