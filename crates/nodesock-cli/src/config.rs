//! Gateway configuration: TOML file + CLI overrides.
//!
//! The file holds a single `[gateway]` section whose keys mirror
//! [`GatewayConfig`]. CLI flags always override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nodesock_core::{ConfigError, GatewayConfig, StringOrList};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl ConfigFile {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub origin: Option<String>,
    pub allowed_servers: Option<String>,
}

/// Load config from a TOML file, apply CLI overrides, and validate.
///
/// A missing file yields defaults; an unreadable or malformed one is an error.
pub fn load(config_path: &Path, overrides: &Overrides) -> Result<GatewayConfig> {
    let expanded = expand_tilde(config_path);
    let file_config = if expanded.exists() {
        info!(path = %expanded.display(), "loading config file");
        let content = std::fs::read_to_string(&expanded)
            .with_context(|| format!("failed to read config at {}", expanded.display()))?;
        ConfigFile::from_toml(&content)
            .with_context(|| format!("failed to parse config at {}", expanded.display()))?
    } else {
        debug!(path = %expanded.display(), "config file not found, using defaults");
        ConfigFile::default()
    };

    let config = apply_overrides(file_config.gateway, overrides);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(mut config: GatewayConfig, overrides: &Overrides) -> GatewayConfig {
    if let Some(host) = &overrides.host {
        config.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(origin) = &overrides.origin {
        config.origin = Some(StringOrList::Single(origin.clone()));
    }
    if let Some(servers) = &overrides.allowed_servers {
        config.allowed_server_addresses = Some(StringOrList::Single(servers.clone()));
    }
    config
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[gateway]
host = "example.com"
port = 4000
origin = "a.com, b.com"
allowed_server_addresses = ["10.0.0.2", "10.0.0.3"]
check_client_origin = false
"#;
        let file = ConfigFile::from_toml(toml_str).unwrap();
        let gw = file.gateway;
        assert_eq!(gw.host, "example.com");
        assert_eq!(gw.port, 4000);
        assert_eq!(gw.origin, Some(StringOrList::Single("a.com, b.com".into())));
        assert_eq!(
            gw.allowed_server_addresses,
            Some(StringOrList::List(vec!["10.0.0.2".into(), "10.0.0.3".into()]))
        );
        assert!(!gw.check_client_origin);
        assert_eq!(gw.handshake_timeout_ms, 2000);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let file = ConfigFile::from_toml("").unwrap();
        assert_eq!(file.gateway, GatewayConfig::default());
    }

    #[test]
    fn malformed_toml_is_error() {
        let err = ConfigFile::from_toml("[gateway]\nport = \"nope\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(&dir.path().join("absent.toml"), &Overrides::default()).unwrap();
        assert_eq!(cfg, GatewayConfig::default());
    }

    #[test]
    fn cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gateway]\nhost = \"file.example\"\norigin = [\"a.com\"]").unwrap();
        let overrides = Overrides {
            host: Some("cli.example".into()),
            port: Some(5000),
            origin: Some("b.com,c.com".into()),
            allowed_servers: None,
        };
        let cfg = load(file.path(), &overrides).unwrap();
        assert_eq!(cfg.host, "cli.example");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.origin, Some(StringOrList::Single("b.com,c.com".into())));
    }

    #[test]
    fn invalid_host_rejected() {
        let overrides = Overrides {
            host: Some("https://example.com".into()),
            ..Overrides::default()
        };
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.toml"), &overrides).is_err());
    }
}
