//! The venting jar: a persisted counter with a short event history.
//!
//! # Data Flow
//! ```text
//! handler
//!     → accessor.rs (read / apply)
//!         → clock.rs (time-of-day text for new entries)
//!         → store::KvStore (concurrent reads, atomic batches)
//!     → JarState { amount, history }
//! ```

pub mod accessor;
pub mod clock;
pub mod types;

pub use accessor::{Jar, JarKeys};
pub use clock::{Clock, FixedClock, LocalClock};
pub use types::{Action, JarError, JarResult, JarState, HISTORY_LIMIT};
