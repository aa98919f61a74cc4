//! Store connection manager.
//!
//! # Responsibilities
//! - Build the Redis client from configuration
//! - Create the single shared connection on first use (race-safe)
//! - Reconnect in the background with capped linear backoff
//! - Give up permanently once the attempt budget is spent
//! - Report lifecycle events (connected, reconnecting, error, gave up, closed)
//!
//! # State Transitions
//! ```text
//! Idle → Connected:            first acquire() succeeds
//! Connected → Reconnecting:    a command hits a transport error
//! Reconnecting → Connected:    a reconnect attempt succeeds
//! Reconnecting → Exhausted:    max_attempts consecutive failures
//! any → Closed:                close() at shutdown
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::RedisError;
use tokio::sync::{OnceCell, RwLock};
use tokio::time::timeout;

use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::resilience::ReconnectPolicy;
use crate::store::types::{StoreError, StoreResult};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 6379;

/// Connection lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle = 0,
    Connected = 1,
    Reconnecting = 2,
    Exhausted = 3,
    Closed = 4,
}

impl From<u8> for ConnectionState {
    fn from(val: u8) -> Self {
        match val {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Reconnecting,
            3 => ConnectionState::Exhausted,
            4 => ConnectionState::Closed,
            _ => ConnectionState::Idle,
        }
    }
}

/// Owner of the process-wide store connection.
///
/// Constructed once at startup, shared through `Arc`, closed at shutdown.
pub struct StoreConnection {
    client: redis::Client,
    /// `host:port` only, never the credential.
    target: String,
    connect_timeout: Duration,
    policy: ReconnectPolicy,
    slot: OnceCell<RwLock<MultiplexedConnection>>,
    state: AtomicU8,
}

impl StoreConnection {
    /// Build the manager. Does not touch the network.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let url = connection_url(config)?;
        let target = describe_target(&url);
        let client = redis::Client::open(url.as_str())
            .map_err(|e| StoreError::Unavailable(format!("invalid store target {}: {}", target, e)))?;

        Ok(Self {
            client,
            target,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            policy: ReconnectPolicy::from_config(&config.reconnect),
            slot: OnceCell::new(),
            state: AtomicU8::new(ConnectionState::Idle as u8),
        })
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.state.load(Ordering::Acquire))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Return the shared connection, creating it on the first call.
    ///
    /// Concurrent first callers wait on the same initialization; at most one
    /// connection is ever established by this path. A failed first connect
    /// is not cached, so a later call tries again.
    pub async fn acquire(&self) -> StoreResult<MultiplexedConnection> {
        match self.state() {
            ConnectionState::Exhausted => {
                return Err(StoreError::Unavailable("reconnect attempts exhausted".to_string()));
            }
            ConnectionState::Closed => {
                return Err(StoreError::Unavailable("connection closed".to_string()));
            }
            _ => {}
        }

        let slot = self
            .slot
            .get_or_try_init(|| async {
                let conn = self.connect_once().await?;
                self.state.store(ConnectionState::Connected as u8, Ordering::Release);
                Ok::<_, StoreError>(RwLock::new(conn))
            })
            .await?;

        Ok(slot.read().await.clone())
    }

    /// Inspect a command failure; transport errors start a reconnect.
    ///
    /// Returns the error mapped for the caller. The failed command itself
    /// is never retried.
    pub fn handle_error(self: &Arc<Self>, err: RedisError) -> StoreError {
        if is_connection_error(&err) {
            tracing::error!(target_addr = %self.target, error = %err, "Store connection error");
            metrics::record_store_event("error");
            self.spawn_reconnect();
        } else {
            tracing::warn!(target_addr = %self.target, error = %err, "Store command failed");
        }
        StoreError::Transient(err.to_string())
    }

    /// Stop serving the connection. Later `acquire` calls fail.
    pub fn close(&self) {
        let previous = self.state.swap(ConnectionState::Closed as u8, Ordering::AcqRel);
        if ConnectionState::from(previous) != ConnectionState::Closed {
            tracing::info!(target_addr = %self.target, "Store connection closed");
            metrics::record_store_event("closed");
        }
    }

    async fn connect_once(&self) -> StoreResult<MultiplexedConnection> {
        match timeout(self.connect_timeout, self.client.get_multiplexed_async_connection()).await {
            Ok(Ok(conn)) => {
                tracing::info!(target_addr = %self.target, "Store client connected");
                metrics::record_store_event("connected");
                Ok(conn)
            }
            Ok(Err(e)) => {
                tracing::error!(target_addr = %self.target, error = %e, "Store connect failed");
                metrics::record_store_event("error");
                Err(StoreError::Unavailable(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    target_addr = %self.target,
                    timeout_secs = self.connect_timeout.as_secs(),
                    "Store connect timed out"
                );
                metrics::record_store_event("error");
                Err(StoreError::Unavailable(format!(
                    "connect timed out after {}s",
                    self.connect_timeout.as_secs()
                )))
            }
        }
    }

    /// Returns true when this call started the reconnect loop.
    fn spawn_reconnect(self: &Arc<Self>) -> bool {
        // Only the first failure observed while connected starts a loop.
        if self
            .state
            .compare_exchange(
                ConnectionState::Connected as u8,
                ConnectionState::Reconnecting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return false;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.reconnect_loop().await;
        });
        true
    }

    async fn reconnect_loop(&self) {
        let mut attempt = 1;
        loop {
            let Some(delay) = self.policy.delay_for(attempt) else {
                tracing::error!(
                    target_addr = %self.target,
                    attempts = attempt - 1,
                    "Too many store connection attempts, giving up"
                );
                metrics::record_store_event("exhausted");
                let _ = self.state.compare_exchange(
                    ConnectionState::Reconnecting as u8,
                    ConnectionState::Exhausted as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                return;
            };

            tracing::info!(target_addr = %self.target, attempt, delay = ?delay, "Store client reconnecting");
            metrics::record_store_event("reconnecting");
            tokio::time::sleep(delay).await;

            if self.state() == ConnectionState::Closed {
                return;
            }

            if let Ok(conn) = self.connect_once().await {
                if let Some(slot) = self.slot.get() {
                    *slot.write().await = conn;
                }
                let _ = self.state.compare_exchange(
                    ConnectionState::Reconnecting as u8,
                    ConnectionState::Connected as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                return;
            }
            attempt += 1;
        }
    }
}

/// True for failures of the transport rather than of a single command.
pub fn is_connection_error(err: &RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout()
}

/// Resolve the configured target into a single connection URL.
pub fn connection_url(config: &StoreConfig) -> StoreResult<String> {
    if let Some(url) = &config.url {
        return Ok(url.clone());
    }

    let host = config.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let mut url = url::Url::parse(&format!("redis://{}:{}", host, port))
        .map_err(|e| StoreError::Unavailable(format!("invalid store host '{}': {}", host, e)))?;
    if let Some(password) = &config.password {
        url.set_password(Some(password))
            .map_err(|_| StoreError::Unavailable("store url cannot carry a password".to_string()))?;
    }
    Ok(url.to_string())
}

fn describe_target(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) => format!(
            "{}:{}",
            url.host_str().unwrap_or(DEFAULT_HOST),
            url.port().unwrap_or(DEFAULT_PORT)
        ),
        Err(_) => "<unparseable>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal RESP server answering `+OK` to every command; counts sockets.
    async fn spawn_fake_store() -> (u16, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    loop {
                        let n = match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        let commands = buf[..n]
                            .iter()
                            .enumerate()
                            .filter(|(i, b)| **b == b'*' && (*i == 0 || buf[i - 1] == b'\n'))
                            .count();
                        for _ in 0..commands {
                            if socket.write_all(b"+OK\r\n").await.is_err() {
                                return;
                            }
                        }
                    }
                });
            }
        });

        (port, accepted)
    }

    fn refused_config() -> StoreConfig {
        let mut config = StoreConfig::default();
        // Port 1 is reserved; nothing listens there in test environments.
        config.host = Some("127.0.0.1".into());
        config.port = Some(1);
        config.connect_timeout_secs = 2;
        config
    }

    #[test]
    fn test_url_from_discrete_target() {
        let mut config = StoreConfig::default();
        config.host = Some("cache.internal".into());
        config.port = Some(6380);
        config.password = Some("p@ss word".into());

        let url = connection_url(&config).unwrap();
        assert_eq!(url, "redis://:p%40ss%20word@cache.internal:6380");
        assert_eq!(describe_target(&url), "cache.internal:6380");
    }

    #[test]
    fn test_url_defaults() {
        let url = connection_url(&StoreConfig::default()).unwrap();
        assert_eq!(url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_explicit_url_wins() {
        let mut config = StoreConfig::default();
        config.url = Some("redis://:secret@db:6390/2".into());
        let url = connection_url(&config).unwrap();
        assert_eq!(url, "redis://:secret@db:6390/2");
        assert_eq!(describe_target(&url), "db:6390");
    }

    #[test]
    fn test_io_errors_are_connection_errors() {
        let err = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(is_connection_error(&err));

        let err = RedisError::from((redis::ErrorKind::TypeError, "not an integer"));
        assert!(!is_connection_error(&err));
    }

    #[tokio::test]
    async fn test_acquire_unreachable_store_fails() {
        let conn = StoreConnection::new(&refused_config()).unwrap();
        let result = conn.acquire().await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_closed_connection_is_unavailable() {
        let conn = StoreConnection::new(&refused_config()).unwrap();
        conn.close();
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert_eq!(
            conn.acquire().await.unwrap_err(),
            StoreError::Unavailable("connection closed".to_string())
        );
    }

    #[tokio::test]
    async fn test_concurrent_first_acquire_connects_once() {
        let (port, accepted) = spawn_fake_store().await;
        let mut config = StoreConfig::default();
        config.host = Some("127.0.0.1".into());
        config.port = Some(port);
        config.connect_timeout_secs = 5;
        let conn = StoreConnection::new(&config).unwrap();

        let (a, b, c, d) = tokio::join!(conn.acquire(), conn.acquire(), conn.acquire(), conn.acquire());
        assert!(a.is_ok() && b.is_ok() && c.is_ok() && d.is_ok());
        assert_eq!(conn.state(), ConnectionState::Connected);

        // Later calls reuse the shared connection too.
        conn.acquire().await.unwrap();
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reconnect_gives_up_after_budget() {
        let mut config = refused_config();
        config.reconnect.step_ms = 1;
        config.reconnect.max_delay_ms = 5;
        config.reconnect.max_attempts = 3;
        let conn = Arc::new(StoreConnection::new(&config).unwrap());
        conn.state.store(ConnectionState::Connected as u8, Ordering::Release);

        let err = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        let mapped = conn.handle_error(err);
        assert!(matches!(mapped, StoreError::Transient(_)));
        assert_eq!(conn.state(), ConnectionState::Reconnecting);

        // A second failure while reconnecting joins the running loop.
        assert!(!conn.spawn_reconnect());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while conn.state() != ConnectionState::Exhausted {
            assert!(tokio::time::Instant::now() < deadline, "reconnect loop never gave up");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(
            conn.acquire().await.unwrap_err(),
            StoreError::Unavailable("reconnect attempts exhausted".to_string())
        );
    }
}
