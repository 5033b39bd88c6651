//! nodesock — socket gateway access parameters.
//!
//! Loads the gateway configuration, resolves the allowed origins and the
//! trusted server addresses, and either prints them for the gateway process
//! or answers a single access check.

mod commands;
mod config;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

/// nodesock — socket gateway access parameters
#[derive(Parser, Debug)]
#[command(name = "nodesock", version, about = "Resolve and check socket gateway access parameters")]
struct Cli {
    /// Config file path
    #[arg(long, global = true, default_value = "~/.nodesock/config.toml")]
    config: String,

    /// Gateway host (IP address or bare domain)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Gateway port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Allowed origins, comma separated
    #[arg(long, global = true)]
    origin: Option<String>,

    /// Allowed server addresses, comma separated
    #[arg(long, global = true)]
    allowed_servers: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective access parameters as JSON
    Resolve {
        /// Pretty-print the JSON document
        #[arg(long)]
        pretty: bool,
    },

    /// Check whether a client origin may connect
    CheckOrigin {
        /// Origin header value, e.g. `https://app.example.com`
        #[arg(id = "request_origin", value_name = "ORIGIN")]
        request_origin: String,
    },

    /// Check whether an address may send server frames
    CheckServer {
        /// Sender IP address
        addr: IpAddr,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr; stdout carries command output.
    use tracing_subscriber::EnvFilter;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "starting nodesock");

    let overrides = config::Overrides {
        host: cli.host.clone(),
        port: cli.port,
        origin: cli.origin.clone(),
        allowed_servers: cli.allowed_servers.clone(),
    };
    let gateway_config = match config::load(&PathBuf::from(&cli.config), &overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to load config");
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Command::Resolve { pretty } => commands::resolve::run(&gateway_config, pretty)
            .await
            .map(|()| true),
        Command::CheckOrigin { request_origin } => {
            commands::check::run_origin(&gateway_config, &request_origin)
        }
        Command::CheckServer { addr } => commands::check::run_server(&gateway_config, addr).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
