//! Rewriting Mirror Proxy Library
//!
//! A mirror proxy that serves the desktop and mobile variants of a fixed
//! upstream site through two local listeners, rewriting absolute origin URLs
//! to point back at the proxy and stamping a trademark glyph after
//! six-character words in visible page text.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod rewrite;
pub mod upstream;

pub use config::schema::MirrorConfig;
pub use lifecycle::Shutdown;
pub use proxy::{ProxyHost, RequestHandler};
