//! In-process key-value store.
//!
//! Used for local runs and tests. A single async mutex guards the whole map,
//! so every batch is applied without any reader seeing it half done.
//! Batches are staged on a copy and committed only if every command
//! succeeds.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::types::{Command, KvStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    List(VecDeque<String>),
}

/// Key-value store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolve Redis-style inclusive indices (negative counts from the end)
/// against a list of `len` elements.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Transient(format!("WRONGTYPE operation against key '{}'", key))
}

fn apply(data: &mut HashMap<String, Value>, command: &Command) -> StoreResult<()> {
    match command {
        Command::IncrBy { key, by } => {
            let current = match data.get(key) {
                None => 0,
                Some(Value::Scalar(raw)) => raw.parse::<i64>().map_err(|_| {
                    StoreError::Transient(format!("value at '{}' is not an integer", key))
                })?,
                Some(Value::List(_)) => return Err(wrong_type(key)),
            };
            let next = current.checked_add(*by).ok_or_else(|| {
                StoreError::Transient(format!("increment would overflow '{}'", key))
            })?;
            data.insert(key.clone(), Value::Scalar(next.to_string()));
        }
        Command::Set { key, value } => {
            data.insert(key.clone(), Value::Scalar(value.clone()));
        }
        Command::Del { key } => {
            data.remove(key);
        }
        Command::LPush { key, value } => {
            match data
                .entry(key.clone())
                .or_insert_with(|| Value::List(VecDeque::new()))
            {
                Value::List(list) => list.push_front(value.clone()),
                Value::Scalar(_) => return Err(wrong_type(key)),
            }
        }
        Command::LTrim { key, start, stop } => {
            let emptied = match data.get_mut(key) {
                None => false,
                Some(Value::Scalar(_)) => return Err(wrong_type(key)),
                Some(Value::List(list)) => match resolve_range(list.len(), *start, *stop) {
                    Some((from, to)) => {
                        list.truncate(to + 1);
                        list.drain(..from);
                        list.is_empty()
                    }
                    None => true,
                },
            };
            // Redis deletes lists that become empty.
            if emptied {
                data.remove(key);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let data = self.data.lock().await;
        match data.get(key) {
            None => Ok(None),
            Some(Value::Scalar(v)) => Ok(Some(v.clone())),
            Some(Value::List(_)) => Err(wrong_type(key)),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let data = self.data.lock().await;
        match data.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Scalar(_)) => Err(wrong_type(key)),
            Some(Value::List(list)) => Ok(match resolve_range(list.len(), start, stop) {
                Some((from, to)) => list.range(from..=to).cloned().collect(),
                None => Vec::new(),
            }),
        }
    }

    async fn exec_atomic(&self, batch: &[Command]) -> StoreResult<()> {
        let mut data = self.data.lock().await;
        let mut staged = data.clone();
        for command in batch {
            apply(&mut staged, command)?;
        }
        *data = staged;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
