//! breakerd — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  TcpServer ── session threads      FileCredentialStore       │
//! │  LogEventSink                      (CredentialStore)         │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────         │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │            AppService (pure logic)                 │      │
//! │  │  parse · authn · authz · registers · interlock     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use breakerd::AppService;
use breakerd::adapters::credentials::FileCredentialStore;
use breakerd::adapters::tcp::TcpServer;
use breakerd::config::ServerConfig;

/// Remote-command server for a simulated breaker panel.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TCP port to listen on (default 2222)
    port: Option<u16>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Credential file: `<user> <password> <privilege>` per line
    #[arg(long)]
    passwd: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Maximum concurrent sessions (1 = one client at a time)
    #[arg(long)]
    max_sessions: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listen_port = port;
        }
        if let Some(path) = self.passwd {
            config.credentials_path = path;
        }
        if let Some(addr) = self.bind {
            config.bind_addr = addr;
        }
        if let Some(n) = self.max_sessions {
            config.max_sessions = n;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config()?;

    info!("breakerd v{}", env!("CARGO_PKG_VERSION"));
    let store = FileCredentialStore::new(config.credentials_path.clone());
    info!("credentials: {}", store.path().display());
    let service = Arc::new(AppService::new(store, &config));

    let mut server = TcpServer::bind(config, service)
        .context("could not open the command port")?;
    server.run().context("listener failed")?;

    info!("server exiting");
    Ok(())
}
