//! Inbound request head reading and parsing.
//!
//! # Responsibilities
//! - Read the request head off the socket, capping the request line at 64 KiB
//! - Distinguish a closed connection from a malformed or oversized head
//! - Parse method, target and headers into a typed `RequestHead`
//!
//! # Design Decisions
//! - The line cap is checked on raw bytes before httparse runs, so a hostile
//!   request line cannot force a large parse
//! - Duplicate headers are preserved via `HeaderMap::append`

use http::{HeaderMap, HeaderName, HeaderValue, Method, Version};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Maximum accepted request-line length in bytes. Longer lines get a 414.
pub const MAX_REQUEST_LINE: usize = 65536;

/// Maximum accepted size of the whole head (request line + headers).
const MAX_HEAD_BYTES: usize = 128 * 1024;

/// Maximum number of headers accepted on a request.
const MAX_HEADERS: usize = 100;

/// Error type for request-head reading.
#[derive(Debug, Error)]
pub enum HeadError {
    /// The peer closed the connection before sending anything.
    #[error("connection closed before a request line was received")]
    Closed,

    /// The request line exceeded [`MAX_REQUEST_LINE`] bytes.
    #[error("request line exceeded {MAX_REQUEST_LINE} bytes")]
    LineTooLong,

    /// The head was syntactically invalid.
    #[error("malformed request head: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The parsed head of an inbound request.
///
/// Only the head is ever read off the socket; request bodies are not relayed
/// upstream.
#[derive(Debug)]
pub struct RequestHead {
    pub method: Method,
    /// Request target exactly as received (path and query).
    pub target: String,
    pub version: Version,
    pub headers: HeaderMap,
}

/// Read and parse one request head from `reader`.
///
/// Returns [`HeadError::Closed`] on an empty initial read,
/// [`HeadError::LineTooLong`] when the request line overruns the cap before a
/// line terminator is seen, and [`HeadError::Malformed`] for anything httparse
/// rejects.
pub async fn read_request_head<R>(reader: &mut R) -> Result<RequestHead, HeadError>
where
    R: AsyncRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Err(HeadError::Closed);
            }
            return Err(HeadError::Malformed("connection closed mid-head".into()));
        }
        buf.extend_from_slice(&chunk[..n]);

        match buf.iter().position(|&b| b == b'\n') {
            None => {
                if buf.len() > MAX_REQUEST_LINE {
                    return Err(HeadError::LineTooLong);
                }
            }
            Some(i) if i >= MAX_REQUEST_LINE => return Err(HeadError::LineTooLong),
            Some(_) => {}
        }

        if let Some(end) = find_head_end(&buf) {
            return parse_head(&buf[..end]);
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(HeadError::Malformed("request head too large".into()));
        }
    }
}

/// Find the end of the head (the blank line), if complete.
fn find_head_end(buf: &[u8]) -> Option<usize> {
    if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some(i + 4);
    }
    buf.windows(2).position(|w| w == b"\n\n").map(|i| i + 2)
}

fn parse_head(raw: &[u8]) -> Result<RequestHead, HeadError> {
    let mut storage = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Request::new(&mut storage);

    match parsed.parse(raw) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => {
            return Err(HeadError::Malformed("truncated request head".into()));
        }
        Err(err) => return Err(HeadError::Malformed(err.to_string())),
    }

    let method = parsed
        .method
        .and_then(|m| Method::from_bytes(m.as_bytes()).ok())
        .ok_or_else(|| HeadError::Malformed("invalid method".into()))?;
    let target = parsed
        .path
        .ok_or_else(|| HeadError::Malformed("missing request target".into()))?
        .to_string();
    let version = match parsed.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };

    let mut headers = HeaderMap::with_capacity(parsed.headers.len());
    for header in parsed.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| HeadError::Malformed(e.to_string()))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|e| HeadError::Malformed(e.to_string()))?;
        headers.append(name, value);
    }

    Ok(RequestHead {
        method,
        target,
        version,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_simple_get() {
        let raw = b"GET /article/1?page=2 HTTP/1.1\r\nHost: example.test\r\nAccept: */*\r\n\r\n";
        let head = read_request_head(&mut &raw[..]).await.unwrap();
        assert_eq!(head.method, Method::GET);
        assert_eq!(head.target, "/article/1?page=2");
        assert_eq!(head.version, Version::HTTP_11);
        assert_eq!(head.headers.get("host").unwrap(), "example.test");
    }

    #[tokio::test]
    async fn test_duplicate_headers_preserved() {
        let raw = b"GET / HTTP/1.1\r\nCookie: a=1\r\nCookie: b=2\r\n\r\n";
        let head = read_request_head(&mut &raw[..]).await.unwrap();
        assert_eq!(head.headers.get_all("cookie").iter().count(), 2);
    }

    #[tokio::test]
    async fn test_empty_read_is_closed() {
        let raw: &[u8] = b"";
        let err = read_request_head(&mut &raw[..]).await.unwrap_err();
        assert!(matches!(err, HeadError::Closed));
    }

    #[tokio::test]
    async fn test_oversized_request_line() {
        let mut raw = vec![b'A'; 70000];
        raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");
        let err = read_request_head(&mut &raw[..]).await.unwrap_err();
        assert!(matches!(err, HeadError::LineTooLong));
    }

    #[tokio::test]
    async fn test_oversized_line_without_terminator() {
        let raw = vec![b'A'; 70000];
        let err = read_request_head(&mut &raw[..]).await.unwrap_err();
        assert!(matches!(err, HeadError::LineTooLong));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let raw = b"\x01\x02\x03\r\n\r\n";
        let err = read_request_head(&mut &raw[..]).await.unwrap_err();
        assert!(matches!(err, HeadError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_truncated_head_is_malformed() {
        let raw = b"GET / HTTP/1.1\r\nHost: example.test\r\n";
        let err = read_request_head(&mut &raw[..]).await.unwrap_err();
        assert!(matches!(err, HeadError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_bare_lf_line_endings() {
        let raw = b"GET / HTTP/1.1\nHost: example.test\n\n";
        let head = read_request_head(&mut &raw[..]).await.unwrap();
        assert_eq!(head.method, Method::GET);
    }
}
