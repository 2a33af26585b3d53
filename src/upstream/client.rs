//! HTTP client for the upstream origin.
//!
//! # Responsibilities
//! - Replay an inbound request's method, path and headers against the origin
//! - Surface 3xx responses verbatim (redirects disabled)
//! - Detect the body's text encoding and byte-range capability
//!
//! # Design Decisions
//! - reqwest negotiates and transparently decompresses upstream gzip, so the
//!   pipeline always sees plain body bytes
//! - Encoding falls back to UTF-8 when the origin declares no charset

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use http::header::{ACCEPT_RANGES, CONTENT_RANGE, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::upstream::UpstreamTarget;

/// Error type for upstream calls.
///
/// Timeouts, connection resets and DNS failures all surface here; the handler
/// closes the inbound connection without a response for any of them.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One origin response, consumed within the request cycle that fetched it.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Declared content type, empty when the origin sent none.
    pub content_type: String,
    /// Detected text encoding (charset parameter, UTF-8 fallback).
    pub encoding: &'static Encoding,
    /// True when the response advertises byte-range capability.
    pub is_byte_range: bool,
}

/// Client for the upstream origin, shared by both handler variants.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Build a client with redirects disabled and the configured timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch `{origin}{path_and_query}` with the given method and headers.
    pub async fn fetch(
        &self,
        target: &UpstreamTarget,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = format!("{}{}", target.origin(), path_and_query);
        let response = self
            .http
            .request(method, &url)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let encoding = encoding_from_content_type(&content_type);
        let is_byte_range = advertises_byte_ranges(status, &headers);

        Ok(UpstreamResponse {
            status,
            headers,
            body,
            content_type,
            encoding,
            is_byte_range,
        })
    }
}

/// Resolve the charset parameter of a Content-Type value, UTF-8 fallback.
pub fn encoding_from_content_type(content_type: &str) -> &'static Encoding {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Encoding::for_label(value.trim().trim_matches('"').as_bytes())
            } else {
                None
            }
        })
        .next()
        .unwrap_or(UTF_8)
}

/// True when a response advertises partial-content support.
///
/// Such responses must bypass text rewriting so range-served bytes stay exact
/// (e.g., video seeking).
pub fn advertises_byte_ranges(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::PARTIAL_CONTENT || headers.contains_key(CONTENT_RANGE) {
        return true;
    }
    headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("bytes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderValue;

    #[test]
    fn test_charset_detected() {
        let enc = encoding_from_content_type("text/html; charset=windows-1251");
        assert_eq!(enc.name(), "windows-1251");
    }

    #[test]
    fn test_charset_quoted_and_spaced() {
        let enc = encoding_from_content_type("text/html; charset=\"KOI8-R\" ; boundary=x");
        assert_eq!(enc.name(), "KOI8-R");
    }

    #[test]
    fn test_missing_charset_falls_back_to_utf8() {
        assert_eq!(encoding_from_content_type("text/html"), UTF_8);
        assert_eq!(encoding_from_content_type(""), UTF_8);
    }

    #[test]
    fn test_unknown_charset_falls_back_to_utf8() {
        assert_eq!(encoding_from_content_type("text/html; charset=klingon"), UTF_8);
    }

    #[test]
    fn test_accept_ranges_bytes_is_byte_range() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        assert!(advertises_byte_ranges(StatusCode::OK, &headers));
    }

    #[test]
    fn test_accept_ranges_none_is_not_byte_range() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("none"));
        assert!(!advertises_byte_ranges(StatusCode::OK, &headers));
    }

    #[test]
    fn test_partial_content_is_byte_range() {
        assert!(advertises_byte_ranges(
            StatusCode::PARTIAL_CONTENT,
            &HeaderMap::new()
        ));
    }

    #[test]
    fn test_plain_response_is_not_byte_range() {
        assert!(!advertises_byte_ranges(StatusCode::OK, &HeaderMap::new()));
    }
}
