//! Outbound response serialization.
//!
//! # Responsibilities
//! - Write status line, headers and body to the client socket
//! - Produce minimal bodyless error responses (414, 400)
//!
//! # Design Decisions
//! - Header values are written as raw bytes; the projector guarantees their
//!   validity
//! - The whole head is assembled in one buffer to avoid small writes

use http::header::{CONNECTION, CONTENT_LENGTH};
use http::{HeaderMap, HeaderValue, StatusCode};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Write a complete response and flush it.
pub async fn write_response<W>(
    writer: &mut W,
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut head = Vec::with_capacity(256 + headers.len() * 32);
    head.extend_from_slice(b"HTTP/1.1 ");
    head.extend_from_slice(status.as_str().as_bytes());
    head.push(b' ');
    head.extend_from_slice(status.canonical_reason().unwrap_or("").as_bytes());
    head.extend_from_slice(b"\r\n");
    for (name, value) in headers {
        head.extend_from_slice(name.as_str().as_bytes());
        head.extend_from_slice(b": ");
        head.extend_from_slice(value.as_bytes());
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(b"\r\n");

    writer.write_all(&head).await?;
    writer.write_all(body).await?;
    writer.flush().await
}

/// Write a bodyless error response (e.g., 414 or 400) and flush it.
pub async fn write_error<W>(writer: &mut W, status: StatusCode) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    write_response(writer, status, &headers, b"").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_response_shape() {
        let mut out: Vec<u8> = Vec::new();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("5"));
        write_response(&mut out, StatusCode::OK, &headers, b"hello")
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[tokio::test]
    async fn test_write_error_has_no_body() {
        let mut out: Vec<u8> = Vec::new();
        write_error(&mut out, StatusCode::URI_TOO_LONG).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 414 URI Too Long\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
