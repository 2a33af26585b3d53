//! Rewriting Mirror Proxy (binary entry point)
//!
//! Brings up the two mirror variants:
//!
//! ```text
//!   desktop listener (default :9999) ──▶ desktop origin
//!   mobile  listener (default :9998) ──▶ mobile origin
//! ```
//!
//! Both share one upstream client and one rewrite pipeline; only the
//! UpstreamTarget / ProxyEndpoint pair differs per variant.

use std::path::PathBuf;

use clap::Parser;

use mirror_proxy::config::loader::load_config;
use mirror_proxy::config::validation::validate_config;
use mirror_proxy::lifecycle::start;
use mirror_proxy::observability::{logging, metrics};
use mirror_proxy::{MirrorConfig, Shutdown};

#[derive(Parser)]
#[command(
    name = "mirror-proxy",
    about = "Rewriting mirror for the desktop and mobile variants of an upstream site"
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Desktop listener port (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Mobile listener port (overrides config).
    #[arg(long)]
    mobile_port: Option<u16>,

    /// Bind host for both listeners (overrides config).
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MirrorConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.desktop_port = port;
    }
    if let Some(port) = cli.mobile_port {
        config.listener.mobile_port = port;
    }
    if let Some(host) = cli.host {
        config.listener.bind_host = host;
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config error: {}", error);
        }
        return Err("invalid configuration".into());
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!("mirror-proxy v0.1.0 starting");
    tracing::info!(
        bind_host = %config.listener.bind_host,
        desktop_port = config.listener.desktop_port,
        mobile_port = config.listener.mobile_port,
        desktop_upstream = %config.upstream.desktop_host,
        mobile_upstream = %config.upstream.mobile_host,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let handles = start(&config, &shutdown).await?;

    shutdown.listen_for_ctrl_c().await;
    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
