//! Body compression.
//!
//! Every outbound body is gzip-compressed exactly once, after rewriting; the
//! header projector advertises the compressed length.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Compression level used for every response body.
const GZIP_LEVEL: u32 = 5;

/// Gzip-compress `body`.
pub fn gzip_encode(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(GZIP_LEVEL));
    encoder.write_all(body)?;
    encoder.finish()
}
