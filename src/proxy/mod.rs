//! Proxy subsystem: per-connection orchestration and the accept loops.
//!
//! # Data Flow
//! ```text
//! net::Listener (desktop)  ┐
//! net::Listener (mobile)   ┴→ server.rs (accept, spawn task per connection)
//!     → handler.rs
//!         read head → override Host/Referer → upstream fetch
//!         → rewrite body → gzip → project headers → write → close
//! ```
//!
//! # Design Decisions
//! - One handler instance per variant, parameterized by its UpstreamTarget;
//!   no type hierarchy and no process-global mutable state
//! - Every failure is scoped to its connection; the accept loops never stop
//!   on a handler error

pub mod handler;
pub mod server;

pub use handler::{RequestHandler, Variant};
pub use server::ProxyHost;
