//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → upstream client → rewriter → targets/endpoints
//!     → bind both listeners → spawn both accept loops
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast signal → accept loops stop → tasks drain
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind last, so traffic only arrives when the pipeline is ready

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, StartupError};
