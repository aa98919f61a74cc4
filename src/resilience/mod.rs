//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Store transport failure:
//!     → store::connection (detects dropped connection)
//!     → backoff.rs (delay for attempt n, or give up)
//!     → reconnect or mark store unavailable
//! ```
//!
//! # Design Decisions
//! - Retry policy is connection-level only; individual commands are never retried
//! - Delays grow linearly and are capped
//! - A hard attempt budget turns a flapping store into a clear failure

pub mod backoff;

pub use backoff::{calculate_backoff, ReconnectPolicy};
