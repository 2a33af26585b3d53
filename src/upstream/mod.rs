//! Upstream origin subsystem.
//!
//! # Data Flow
//! ```text
//! proxy::handler
//!     → UpstreamTarget (fixed scheme + host per variant)
//!     → client.rs (reqwest, redirects disabled)
//!     → UpstreamResponse (status, headers, bytes, encoding, range marker)
//! ```
//!
//! # Design Decisions
//! - Redirects are never followed; 3xx responses flow back to the client so
//!   their Location headers can be rewritten like any other content
//! - Exactly one upstream attempt per inbound request; no retries

pub mod client;

use http::HeaderValue;

pub use client::{UpstreamClient, UpstreamError, UpstreamResponse};

/// A fixed upstream origin one handler variant mirrors.
///
/// Two targets exist system-wide: the desktop host and its mobile-subdomain
/// counterpart. Both are constant for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: String,
    host: String,
    host_value: HeaderValue,
}

impl UpstreamTarget {
    /// Build a target; fails if `host` is not a valid header value.
    pub fn new(scheme: &str, host: &str) -> Result<Self, http::header::InvalidHeaderValue> {
        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            host_value: HeaderValue::from_str(host)?,
        })
    }

    /// The origin prefix, e.g. `https://example.test`.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// The bare host, as placed into `Host`/`Referer` request headers.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The host as a ready-made header value.
    pub fn host_value(&self) -> &HeaderValue {
        &self.host_value
    }
}
