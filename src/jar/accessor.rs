//! Jar state accessor.
//!
//! # Responsibilities
//! - Own the two persisted keys (counter scalar, history list)
//! - Read both concurrently, defaulting missing keys for display
//! - Build the atomic add and reset batches
//!
//! # Batches
//! ```text
//! add:   INCRBY amount 1 → LPUSH history "<time>: Added $1 to the jar" → LTRIM history 0 4
//! reset: SET amount 0    → DEL history → LPUSH history "<time>: Jar was reset to $0"
//! ```
//!
//! Counter and history always change inside the same batch. There is no
//! locking here; concurrent adds are serialized by the store.

use std::sync::Arc;

use crate::jar::clock::{Clock, LocalClock};
use crate::jar::types::{Action, JarResult, JarState, HISTORY_LIMIT};
use crate::observability::metrics;
use crate::store::{Command, KvStore, StoreError};

/// Fully qualified key names for one jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarKeys {
    pub amount: String,
    pub history: String,
}

impl JarKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            amount: format!("{}:jarAmount", namespace),
            history: format!("{}:jarHistory", namespace),
        }
    }
}

/// Read/update operations over the persisted jar.
#[derive(Clone)]
pub struct Jar {
    store: Arc<dyn KvStore>,
    keys: JarKeys,
    clock: Arc<dyn Clock>,
}

impl Jar {
    pub fn new(store: Arc<dyn KvStore>, namespace: &str) -> Self {
        Self::with_clock(store, namespace, Arc::new(LocalClock))
    }

    pub fn with_clock(store: Arc<dyn KvStore>, namespace: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            keys: JarKeys::new(namespace),
            clock,
        }
    }

    pub fn keys(&self) -> &JarKeys {
        &self.keys
    }

    /// Current counter and up to [`HISTORY_LIMIT`] newest history entries.
    pub async fn read(&self) -> JarResult<JarState> {
        let last = HISTORY_LIMIT as isize - 1;
        let (amount, history) = tokio::join!(
            self.store.get(&self.keys.amount),
            self.store.lrange(&self.keys.history, 0, last),
        );

        let amount = parse_amount(amount?.as_deref())?;
        Ok(JarState {
            amount,
            history: history?,
        })
    }

    /// Apply `action` atomically and return the resulting state.
    pub async fn apply(&self, action: Action) -> JarResult<JarState> {
        let entry = format!("{}: {}", self.clock.time_of_day(), action.description());

        let result = self.commit(action, entry).await;

        metrics::record_jar_action(action.as_str(), result.is_ok());
        if let Ok(state) = &result {
            tracing::info!(
                action = %action,
                amount = state.amount,
                backend = self.store.backend_name(),
                "Jar updated"
            );
        }
        result
    }

    async fn commit(&self, action: Action, entry: String) -> JarResult<JarState> {
        match action {
            Action::Add => {
                self.store.exec_atomic(&self.add_batch(entry)).await?;
                // Fresh read: other clients may have committed in between.
                self.read().await
            }
            Action::Reset => {
                self.store.exec_atomic(&self.reset_batch(entry.clone())).await?;
                Ok(JarState {
                    amount: 0,
                    history: vec![entry],
                })
            }
        }
    }

    fn add_batch(&self, entry: String) -> Vec<Command> {
        vec![
            Command::IncrBy {
                key: self.keys.amount.clone(),
                by: 1,
            },
            Command::LPush {
                key: self.keys.history.clone(),
                value: entry,
            },
            Command::LTrim {
                key: self.keys.history.clone(),
                start: 0,
                stop: HISTORY_LIMIT as isize - 1,
            },
        ]
    }

    fn reset_batch(&self, entry: String) -> Vec<Command> {
        vec![
            Command::Set {
                key: self.keys.amount.clone(),
                value: "0".to_string(),
            },
            Command::Del {
                key: self.keys.history.clone(),
            },
            Command::LPush {
                key: self.keys.history.clone(),
                value: entry,
            },
        ]
    }
}

fn parse_amount(raw: Option<&str>) -> Result<u64, StoreError> {
    match raw {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| StoreError::Transient(format!("counter holds non-numeric value '{}'", raw))),
    }
}
