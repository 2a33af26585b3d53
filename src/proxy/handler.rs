//! Per-connection request handling.
//!
//! # Responsibilities
//! - Read and police the inbound request head (414 on over-long lines)
//! - Override Host/Referer and replay the request upstream
//! - Run the body through the rewrite pipeline and gzip
//! - Project upstream headers onto the outbound response
//! - Write the response and close the connection
//!
//! # Design Decisions
//! - Request bodies are not relayed; only the head is forwarded
//! - Upstream failures close the inbound connection without a response
//! - Inbound reads and writes are bounded by the configured IO timeout

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::header::{
    ACCEPT_ENCODING, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, HOST, LOCATION, REFERER,
    TRANSFER_ENCODING,
};
use http::{HeaderMap, HeaderValue, StatusCode};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::request::{read_request_head, HeadError, RequestHead};
use crate::http::response::{write_error, write_response};
use crate::net::ConnectionId;
use crate::observability::metrics;
use crate::rewrite::{gzip_encode, BodyRewriter, UrlRewriter};
use crate::upstream::{UpstreamClient, UpstreamResponse, UpstreamTarget};

/// How long an error path drains the inbound socket so the rejection reaches
/// the client before teardown.
const LINGER_TIMEOUT: Duration = Duration::from_secs(1);

/// Which mirror a handler serves. Used for log fields and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Desktop,
    Mobile,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Desktop => "desktop",
            Variant::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handles every connection accepted by one listener variant.
///
/// Stateless across requests: each connection gets its own head, upstream
/// response and rewritten body, all discarded when the task ends.
pub struct RequestHandler {
    variant: Variant,
    target: UpstreamTarget,
    client: UpstreamClient,
    rewriter: Arc<BodyRewriter>,
    urls: Arc<UrlRewriter>,
    io_timeout: Duration,
}

impl RequestHandler {
    pub fn new(
        variant: Variant,
        target: UpstreamTarget,
        client: UpstreamClient,
        rewriter: Arc<BodyRewriter>,
        urls: Arc<UrlRewriter>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            variant,
            target,
            client,
            rewriter,
            urls,
            io_timeout,
        }
    }

    /// Serve one inbound connection, then close it.
    pub async fn handle(&self, mut stream: TcpStream) {
        let conn = ConnectionId::new();
        let start = Instant::now();
        let (mut reader, mut writer) = stream.split();

        let head = match timeout(self.io_timeout, read_request_head(&mut reader)).await {
            Err(_) => {
                tracing::warn!(%conn, variant = %self.variant, "Inbound read timed out");
                return;
            }
            Ok(Err(HeadError::Closed)) => return,
            Ok(Err(HeadError::LineTooLong)) => {
                tracing::debug!(%conn, variant = %self.variant, "Request line too long");
                metrics::record_rejected(self.variant.as_str(), "request-line-too-long");
                let _ = timeout(
                    self.io_timeout,
                    write_error(&mut writer, StatusCode::URI_TOO_LONG),
                )
                .await;
                // Lingering close: drain what the client already sent so the
                // 414 reaches it before the socket is torn down.
                let _ = timeout(LINGER_TIMEOUT, drain(&mut reader)).await;
                return;
            }
            Ok(Err(err)) => {
                tracing::debug!(%conn, variant = %self.variant, error = %err, "Malformed request head");
                metrics::record_rejected(self.variant.as_str(), "malformed");
                let _ = timeout(
                    self.io_timeout,
                    write_error(&mut writer, StatusCode::BAD_REQUEST),
                )
                .await;
                let _ = timeout(LINGER_TIMEOUT, drain(&mut reader)).await;
                return;
            }
            Ok(Ok(head)) => head,
        };

        tracing::debug!(
            %conn,
            variant = %self.variant,
            method = %head.method,
            target = %head.target,
            "Proxying request"
        );

        let headers = self.forward_headers(&head);
        let response = match self
            .client
            .fetch(&self.target, head.method.clone(), &head.target, headers)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(%conn, variant = %self.variant, error = %err, "Upstream request failed");
                metrics::record_upstream_error(self.variant.as_str());
                return;
            }
        };

        let body = self.rewriter.rewrite(&response);
        let compressed = match gzip_encode(&body) {
            Ok(compressed) => compressed,
            Err(err) => {
                tracing::error!(%conn, variant = %self.variant, error = %err, "Body compression failed");
                return;
            }
        };
        let out_headers = project_headers(&response, compressed.len(), &self.urls);

        metrics::record_request(
            head.method.as_str(),
            response.status.as_u16(),
            self.variant.as_str(),
            start,
        );

        match timeout(
            self.io_timeout,
            write_response(&mut writer, response.status, &out_headers, &compressed),
        )
        .await
        {
            Err(_) => {
                tracing::warn!(%conn, variant = %self.variant, "Inbound write timed out");
            }
            Ok(Err(err)) => {
                tracing::debug!(%conn, variant = %self.variant, error = %err, "Client write failed");
            }
            Ok(Ok(())) => {
                tracing::debug!(
                    %conn,
                    variant = %self.variant,
                    status = response.status.as_u16(),
                    bytes = compressed.len(),
                    "Request served"
                );
            }
        }
    }

    /// Build the header set forwarded upstream.
    ///
    /// Host and Referer are overwritten to the upstream host (the origin may
    /// reject or mis-route requests carrying the proxy's own). Accept-Encoding
    /// is left to reqwest's own negotiation, and body-framing headers are
    /// dropped because no request body is relayed.
    fn forward_headers(&self, head: &RequestHead) -> HeaderMap {
        let mut headers = head.headers.clone();
        headers.remove(ACCEPT_ENCODING);
        headers.remove(CONNECTION);
        headers.remove(CONTENT_LENGTH);
        headers.remove(TRANSFER_ENCODING);
        headers.insert(HOST, self.target.host_value().clone());
        headers.insert(REFERER, self.target.host_value().clone());
        headers
    }
}

/// Copy upstream headers onto the outbound response.
///
/// `Content-Encoding`, `Connection`, `Transfer-Encoding` and `Content-Length`
/// are all invalidated by rewriting and recompression and are recomputed;
/// `Location` values are passed through the URL rewriter so redirects stay on
/// the proxy. Everything else is copied verbatim.
pub fn project_headers(
    response: &UpstreamResponse,
    compressed_len: usize,
    urls: &UrlRewriter,
) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(response.headers.len() + 2);
    for (name, value) in &response.headers {
        if *name == CONTENT_ENCODING
            || *name == CONNECTION
            || *name == TRANSFER_ENCODING
            || *name == CONTENT_LENGTH
        {
            continue;
        }
        if *name == LOCATION {
            if let Some(rewritten) = value
                .to_str()
                .ok()
                .map(|v| urls.apply(v))
                .and_then(|v| HeaderValue::from_str(&v).ok())
            {
                out.append(name.clone(), rewritten);
                continue;
            }
        }
        out.append(name.clone(), value.clone());
    }
    out.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    out.insert(CONTENT_LENGTH, HeaderValue::from(compressed_len));
    out
}

/// Read and discard inbound bytes until EOF or error.
async fn drain<R>(reader: &mut R)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut sink = [0u8; 4096];
    loop {
        match reader.read(&mut sink).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}
