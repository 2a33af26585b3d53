//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (read head with request-line cap, parse, reject 414/400)
//!     → [proxy::handler replays the request upstream and rewrites the body]
//!     → response.rs (serialize status line, headers, body to the socket)
//! ```
//!
//! # Design Decisions
//! - The request head is read byte-level so over-long request lines can be
//!   rejected with 414 before any parsing happens
//! - Request bodies are never read; this proxy forwards the head only
//! - Every response closes the connection; there is no keep-alive

pub mod request;
pub mod response;

pub use request::{read_request_head, HeadError, RequestHead, MAX_REQUEST_LINE};
pub use response::{write_error, write_response};
