//! Redis-backed key-value store.
//!
//! Batches run as `MULTI`/`EXEC` transactions, so Redis executes every
//! command of a batch back to back with no other client interleaved.

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::connection::StoreConnection;
use crate::store::types::{Command, KvStore, StoreResult};

/// [`KvStore`] over the shared [`StoreConnection`].
#[derive(Clone)]
pub struct RedisStore {
    conn: Arc<StoreConnection>,
}

impl RedisStore {
    pub fn new(conn: Arc<StoreConnection>) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Arc<StoreConnection> {
        &self.conn
    }
}

/// Translate a batch into one atomic pipeline with every reply discarded.
pub fn build_transaction(batch: &[Command]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for command in batch {
        match command {
            Command::IncrBy { key, by } => pipe.cmd("INCRBY").arg(key).arg(*by).ignore(),
            Command::Set { key, value } => pipe.cmd("SET").arg(key).arg(value).ignore(),
            Command::Del { key } => pipe.cmd("DEL").arg(key).ignore(),
            Command::LPush { key, value } => pipe.cmd("LPUSH").arg(key).arg(value).ignore(),
            Command::LTrim { key, start, stop } => {
                pipe.cmd("LTRIM").arg(key).arg(*start).arg(*stop).ignore()
            }
        };
    }
    pipe
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.acquire().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| self.conn.handle_error(e))?;
        Ok(value)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.acquire().await?;
        let items: Vec<String> = redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(|e| self.conn.handle_error(e))?;
        Ok(items)
    }

    async fn exec_atomic(&self, batch: &[Command]) -> StoreResult<()> {
        let mut conn = self.conn.acquire().await?;
        let () = build_transaction(batch)
            .query_async(&mut conn)
            .await
            .map_err(|e| self.conn.handle_error(e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
