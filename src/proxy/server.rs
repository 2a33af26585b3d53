//! Accept loop for one proxy variant.
//!
//! # Responsibilities
//! - Accept connections from the variant's bounded listener
//! - Spawn one task per connection, moving the permit into it
//! - Stop accepting when the shutdown signal fires
//!
//! # Design Decisions
//! - Accept errors are logged and the loop continues; they never kill the
//!   variant
//! - In-flight connections are not cancelled on shutdown; they finish under
//!   their own IO timeouts

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::net::Listener;
use crate::proxy::handler::RequestHandler;

/// Owns one listening socket and dispatches its connections to the variant's
/// request handler. Two hosts run concurrently, one per variant.
pub struct ProxyHost {
    listener: Listener,
    handler: Arc<RequestHandler>,
}

impl ProxyHost {
    pub fn new(listener: Listener, handler: Arc<RequestHandler>) -> Self {
        Self { listener, handler }
    }

    /// Run the accept loop until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Accept loop stopping");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer, permit)) => {
                            let handler = Arc::clone(&self.handler);
                            tokio::spawn(async move {
                                let _permit = permit;
                                handler.handle(stream).await;
                                tracing::trace!(peer_addr = %peer, "Connection finished");
                            });
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "Accept failed");
                        }
                    }
                }
            }
        }
    }
}
