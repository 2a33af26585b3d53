//! Network foundation subsystem.
//!
//! # Data Flow
//! ```text
//! OS accept queue
//!     → listener.rs (bounded accept, one listener per variant)
//!     → connection.rs (per-connection identity for tracing)
//!     → proxy::handler (one spawned task per connection)
//! ```
//!
//! # Design Decisions
//! - Connection limits enforced with a semaphore, permit held for the
//!   connection's lifetime
//! - Accept errors are logged and retried; they never stop the listener

pub mod connection;
pub mod listener;

pub use connection::ConnectionId;
pub use listener::{ConnectionPermit, Listener, ListenerError};
