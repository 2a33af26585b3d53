//! Origin URL rewriting.
//!
//! # Responsibilities
//! - Replace literal origin URL prefixes (both schemes, both hosts) with the
//!   matching local endpoint URL
//! - Patch the origin's mobile-detection redirect script so it points at the
//!   local mobile endpoint
//!
//! # Design Decisions
//! - Plain substring replacement, no regex; rules are built once at startup
//! - Runs on the full body text before any HTML parsing, because the redirect
//!   script lives inside a `<script>` block the text-node selector skips
//! - Idempotent on text that no longer contains an origin URL form

use crate::upstream::UpstreamTarget;

/// Script fragment the origin uses to bounce mobile browsers to its mobile
/// host.
const MOBILE_REDIRECT_FRAGMENT: &str = "document.location.href = url;";

/// The outward-facing address of one proxy variant.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    host: String,
    port: u16,
}

impl ProxyEndpoint {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    /// The endpoint as a URL prefix, e.g. `http://127.0.0.1:9999`.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Rewrites origin URLs and the mobile-redirect script to local endpoints.
///
/// Both handler variants share one rewriter carrying all four origin URL
/// forms, so navigation between the desktop and mobile mirrors keeps working
/// from either side.
#[derive(Debug)]
pub struct UrlRewriter {
    /// (origin prefix, local endpoint URL) pairs, mobile host first.
    rules: Vec<(String, String)>,
    /// Replacement for [`MOBILE_REDIRECT_FRAGMENT`].
    redirect_patch: String,
}

impl UrlRewriter {
    pub fn new(
        desktop: &UpstreamTarget,
        mobile: &UpstreamTarget,
        desktop_endpoint: &ProxyEndpoint,
        mobile_endpoint: &ProxyEndpoint,
    ) -> Self {
        let rules = vec![
            (format!("https://{}", mobile.host()), mobile_endpoint.url()),
            (format!("http://{}", mobile.host()), mobile_endpoint.url()),
            (format!("https://{}", desktop.host()), desktop_endpoint.url()),
            (format!("http://{}", desktop.host()), desktop_endpoint.url()),
        ];
        let redirect_patch = format!("document.location.href = \"{}\";", mobile_endpoint.url());
        Self {
            rules,
            redirect_patch,
        }
    }

    /// Apply every rule to `text`, returning the rewritten copy.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.replace(MOBILE_REDIRECT_FRAGMENT, &self.redirect_patch);
        for (from, to) in &self.rules {
            out = out.replace(from, to);
        }
        out
    }
}
