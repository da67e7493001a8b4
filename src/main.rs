//! Forwarding proxy (v1)
//!
//! ```text
//!     Client Request
//!     ──────────────▶ clean prefixes ─▶ resolve target ─▶ sanitize headers
//!                                                              │
//!                                   URL matches a log substring?
//!                                     yes: buffer body, log block + curl
//!                                     no:  stream body
//!                                                              │
//!     Client Response                                          ▼
//!     ◀────────────── response deny-list ◀──────────── dispatch (reqwest) ◀──▶ Target
//! ```

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use forward_proxy::lifecycle::{start, Shutdown};
use forward_proxy::observability::init_tracing;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forwarding HTTP proxy with request logging", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener port, overriding the configured bind address's port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Origin that relative request paths are forwarded to.
    #[arg(long)]
    default_backend: Option<String>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(port) = self.port {
            let host = config
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            config.listener.bind_address = format!("{host}:{port}");
        }
        if let Some(backend) = self.default_backend {
            config.rewrite.default_backend = backend;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_tracing(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_backend = %config.rewrite.default_backend,
        log_paths = ?config.request_log.path_substrings,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
