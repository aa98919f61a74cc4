//! Key-value store subsystem.
//!
//! # Data Flow
//! ```text
//! jar accessor
//!     → KvStore (get / lrange / exec_atomic)
//!         → redis_store.rs → connection.rs (shared connection, reconnect)
//!         → memory.rs (in-process map, tests and local runs)
//! ```
//!
//! # Design Decisions
//! - The jar only sees the `KvStore` trait; backends are chosen at startup
//! - Atomicity of a batch is the backend's job, never the caller's
//! - Commands are not retried; only the connection is

pub mod connection;
pub mod memory;
pub mod redis_store;
pub mod types;

pub use connection::{ConnectionState, StoreConnection};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use types::{Command, KvStore, StoreError, StoreResult};
