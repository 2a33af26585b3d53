//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared upstream client and rewrite pipeline
//! - Derive the two UpstreamTarget / ProxyEndpoint pairs from config
//! - Bind both listeners and spawn both accept loops
//!
//! # Design Decisions
//! - Subsystems initialize in dependency order, not concurrently
//! - Any startup error is fatal; partial startup never serves traffic

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::MirrorConfig;
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::proxy::{ProxyHost, RequestHandler, Variant};
use crate::rewrite::{BodyRewriter, ProxyEndpoint, UrlRewriter};
use crate::upstream::{UpstreamClient, UpstreamError, UpstreamTarget};

/// Error type for startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address: {0}")]
    BindAddress(String),

    #[error("invalid upstream host: {0}")]
    UpstreamHost(#[from] http::header::InvalidHeaderValue),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Bring up both proxy variants and return their accept-loop handles.
pub async fn start(
    config: &MirrorConfig,
    shutdown: &Shutdown,
) -> Result<Vec<JoinHandle<()>>, StartupError> {
    let desktop_target = UpstreamTarget::new(&config.upstream.scheme, &config.upstream.desktop_host)?;
    let mobile_target = UpstreamTarget::new(&config.upstream.scheme, &config.upstream.mobile_host)?;
    let desktop_endpoint =
        ProxyEndpoint::new(&config.listener.bind_host, config.listener.desktop_port);
    let mobile_endpoint = ProxyEndpoint::new(&config.listener.bind_host, config.listener.mobile_port);

    let urls = Arc::new(UrlRewriter::new(
        &desktop_target,
        &mobile_target,
        &desktop_endpoint,
        &mobile_endpoint,
    ));
    let rewriter = Arc::new(BodyRewriter::new(Arc::clone(&urls)));
    let client = UpstreamClient::new(&config.timeouts)?;
    let io_timeout = Duration::from_secs(config.timeouts.client_io_secs);

    let mut handles = Vec::with_capacity(2);
    let variants = [
        (Variant::Desktop, desktop_target, config.listener.desktop_port),
        (Variant::Mobile, mobile_target, config.listener.mobile_port),
    ];
    for (variant, target, port) in variants {
        let addr: SocketAddr = format!("{}:{}", config.listener.bind_host, port)
            .parse()
            .map_err(|_| {
                StartupError::BindAddress(format!("{}:{}", config.listener.bind_host, port))
            })?;
        let listener = Listener::bind(addr, config.listener.max_connections).await?;

        tracing::info!(
            variant = %variant,
            address = %addr,
            upstream = %target.origin(),
            "Mirror listening"
        );

        let handler = Arc::new(RequestHandler::new(
            variant,
            target,
            client.clone(),
            Arc::clone(&rewriter),
            Arc::clone(&urls),
            io_timeout,
        ));
        let host = ProxyHost::new(listener, handler);
        handles.push(tokio::spawn(host.run(shutdown.subscribe())));
    }

    Ok(handles)
}
