//! Response body rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamResponse
//!     → byte-range or non-text content → raw bytes, untouched
//!     → otherwise decode (detected encoding)
//!         → urls.rs (origin URLs + mobile-redirect script → local endpoints)
//!         → text/html only: dom.rs (parse, mark text nodes, re-serialize)
//!         → re-encode with the same encoding
//!     → encoder.rs (gzip)
//! ```
//!
//! # Design Decisions
//! - URL rewriting runs before parsing so script-embedded URLs are covered
//! - Range-capable responses pass through byte-for-byte, whatever their
//!   declared content type; range-served media must stay byte-exact
//! - Non-text content types are never decoded; text decoding is lossy on
//!   arbitrary binary

pub mod dom;
pub mod encoder;
pub mod marker;
pub mod urls;

use std::sync::Arc;

pub use encoder::gzip_encode;
pub use marker::{WordMarker, MARKER_GLYPH};
pub use urls::{ProxyEndpoint, UrlRewriter};

use crate::upstream::UpstreamResponse;

/// Orchestrates the per-response rewrite: URL substitution, HTML-aware word
/// marking, and encoding-correct re-serialization.
#[derive(Debug)]
pub struct BodyRewriter {
    urls: Arc<UrlRewriter>,
    marker: WordMarker,
}

impl BodyRewriter {
    pub fn new(urls: Arc<UrlRewriter>) -> Self {
        Self {
            urls,
            marker: WordMarker::new(),
        }
    }

    /// Produce the rewritten body bytes for one upstream response.
    pub fn rewrite(&self, response: &UpstreamResponse) -> Vec<u8> {
        if response.is_byte_range || !is_textual(&response.content_type) {
            return response.body.clone();
        }

        let (text, _, _) = response.encoding.decode(&response.body);
        let text = self.urls.apply(&text);

        if response.content_type.to_ascii_lowercase().contains("text/html") {
            let marked = dom::mark_document(&text, &self.marker);
            response.encoding.encode(&marked).0.into_owned()
        } else {
            response.encoding.encode(&text).0.into_owned()
        }
    }
}

/// True for content types whose bodies are text and safe to decode.
fn is_textual(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.starts_with("text/")
        || content_type.contains("json")
        || content_type.contains("javascript")
        || content_type.contains("xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1251};
    use http::{HeaderMap, StatusCode};

    use crate::upstream::{UpstreamResponse, UpstreamTarget};

    fn rewriter() -> BodyRewriter {
        let desktop = UpstreamTarget::new("https", "example.test").unwrap();
        let mobile = UpstreamTarget::new("https", "m.example.test").unwrap();
        let urls = Arc::new(UrlRewriter::new(
            &desktop,
            &mobile,
            &ProxyEndpoint::new("127.0.0.1", 9999),
            &ProxyEndpoint::new("127.0.0.1", 9998),
        ));
        BodyRewriter::new(urls)
    }

    fn response(
        content_type: &str,
        body: Vec<u8>,
        encoding: &'static encoding_rs::Encoding,
        is_byte_range: bool,
    ) -> UpstreamResponse {
        UpstreamResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body,
            content_type: content_type.to_string(),
            encoding,
            is_byte_range,
        }
    }

    #[test]
    fn test_byte_range_passthrough_is_byte_exact() {
        let body = vec![0u8, 159, 146, 150, 255, 1, 2, 3];
        let response = response("text/html", body.clone(), UTF_8, true);
        assert_eq!(rewriter().rewrite(&response), body);
    }

    #[test]
    fn test_binary_content_passthrough() {
        let body = vec![0xffu8, 0xd8, 0xff, 0xe0, 0x00];
        let response = response("image/jpeg", body.clone(), UTF_8, false);
        assert_eq!(rewriter().rewrite(&response), body);
    }

    #[test]
    fn test_missing_content_type_passthrough() {
        let body = b"anything".to_vec();
        let response = response("", body.clone(), UTF_8, false);
        assert_eq!(rewriter().rewrite(&response), body);
    }

    #[test]
    fn test_html_marked_and_url_rewritten() {
        let body = b"<html><body><p>mirror target</p>\
                     <a href=\"https://example.test/a\">go</a></body></html>"
            .to_vec();
        let response = response("text/html; charset=utf-8", body, UTF_8, false);
        let out = String::from_utf8(rewriter().rewrite(&response)).unwrap();
        assert!(out.contains("<p>mirror™ target</p>"));
        assert!(out.contains("href=\"http://127.0.0.1:9999/a\""));
    }

    #[test]
    fn test_json_url_rewritten_without_parsing() {
        let body = br#"{"next":"https://m.example.test/page","label":"mirror"}"#.to_vec();
        let response = response("application/json", body, UTF_8, false);
        let out = String::from_utf8(rewriter().rewrite(&response)).unwrap();
        assert!(out.contains("http://127.0.0.1:9998/page"));
        // No word marking outside HTML.
        assert!(!out.contains(MARKER_GLYPH));
    }

    #[test]
    fn test_non_utf8_encoding_round_trips() {
        let source = "<html><body><p>mirror</p></body></html>";
        let body = WINDOWS_1251.encode(source).0.into_owned();
        let response = response("text/html; charset=windows-1251", body, WINDOWS_1251, false);
        let out = rewriter().rewrite(&response);
        let (decoded, _, _) = WINDOWS_1251.decode(&out);
        assert!(decoded.contains("mirror™"));
    }

    #[test]
    fn test_is_textual_classification() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("text/plain"));
        assert!(is_textual("application/json"));
        assert!(is_textual("application/javascript"));
        assert!(is_textual("image/svg+xml"));
        assert!(!is_textual("video/mp4"));
        assert!(!is_textual("application/octet-stream"));
        assert!(!is_textual(""));
    }
}
