//! Store-facing types and error definitions.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the key-value store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No connection could be established, the reconnect budget is spent,
    /// or the connection was closed at shutdown.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A single command or batch failed. Not retried.
    #[error("store command failed: {0}")]
    Transient(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add `by` to the integer at `key`, creating it at 0 first if missing.
    IncrBy { key: String, by: i64 },
    /// Overwrite `key` with a scalar value.
    Set { key: String, value: String },
    /// Remove `key` regardless of type.
    Del { key: String },
    /// Insert `value` at the head of the list at `key`.
    LPush { key: String, value: String },
    /// Keep only list elements `start..=stop` (inclusive, zero-based).
    LTrim { key: String, start: isize, stop: isize },
}

/// Minimal key-value surface the jar needs.
///
/// `exec_atomic` must apply the whole batch or nothing, and no concurrent
/// reader may observe a partially applied batch.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a scalar value. `None` when the key does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Read list elements `start..=stop`. Empty when the key does not exist.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    /// Apply every command in `batch` as one atomic unit.
    async fn exec_atomic(&self, batch: &[Command]) -> StoreResult<()>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
