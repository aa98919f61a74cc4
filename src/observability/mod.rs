//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, jar accessor, store connection produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every handler log line
//! - Store failures are logged with cause; clients only see a fixed message

pub mod logging;
pub mod metrics;
