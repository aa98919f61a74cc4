//! Startup orchestration and teardown.
//!
//! # Responsibilities
//! - Build the store backend selected by configuration
//! - Construct the single store connection and own it for the process lifetime
//! - Assemble the jar accessor and HTTP server
//! - Serve until shutdown, then drain and close the connection
//!
//! # Design Decisions
//! - Invalid configuration is fatal
//! - An unreachable store is not: the first connect is attempted eagerly and
//!   logged, and requests retry `acquire` until the store comes up
//! - Teardown runs after the server has drained, never before

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{JarConfig, StoreBackend};
use crate::http::HttpServer;
use crate::jar::Jar;
use crate::lifecycle::shutdown::Shutdown;
use crate::store::{KvStore, MemoryStore, RedisStore, StoreConnection, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Fully wired service. Owns the store connection.
pub struct Application {
    config: JarConfig,
    jar: Jar,
    connection: Option<Arc<StoreConnection>>,
}

impl Application {
    /// Wire every subsystem from `config`.
    pub async fn build(config: JarConfig) -> Result<Self, StartupError> {
        let (store, connection): (Arc<dyn KvStore>, Option<Arc<StoreConnection>>) =
            match config.store.backend {
                StoreBackend::Memory => {
                    tracing::warn!("Using in-memory store; jar state is lost on restart");
                    (Arc::new(MemoryStore::new()) as Arc<dyn KvStore>, None)
                }
                StoreBackend::Redis => {
                    let connection = Arc::new(StoreConnection::new(&config.store)?);
                    tracing::info!(target_addr = %connection.target(), "Connecting to store");
                    if let Err(e) = connection.acquire().await {
                        tracing::warn!(
                            error = %e,
                            "Store not reachable at startup; requests will retry the connection"
                        );
                    }
                    (
                        Arc::new(RedisStore::new(connection.clone())) as Arc<dyn KvStore>,
                        Some(connection),
                    )
                }
            };

        let jar = Jar::new(store, &config.store.namespace);

        Ok(Self {
            config,
            jar,
            connection,
        })
    }

    pub fn jar(&self) -> &Jar {
        &self.jar
    }

    pub fn config(&self) -> &JarConfig {
        &self.config
    }

    /// Bind the configured listener address.
    pub async fn bind(&self) -> Result<TcpListener, StartupError> {
        let address = self.config.listener.bind_address.clone();
        TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind { address, source })
    }

    /// Serve on `listener` until `shutdown` fires, then tear down.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), StartupError> {
        let server = HttpServer::new(self.config.clone(), self.jar.clone());
        let result = server.run(listener, shutdown.subscribe()).await;
        self.teardown();
        result.map_err(StartupError::from)
    }

    /// Close the store connection. Idempotent.
    pub fn teardown(&self) {
        if let Some(connection) = &self.connection {
            connection.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jar::Action;

    #[tokio::test]
    async fn test_memory_application_round_trip() {
        let mut config = JarConfig::default();
        config.store.backend = StoreBackend::Memory;

        let app = Application::build(config).await.unwrap();
        let state = app.jar().apply(Action::Add).await.unwrap();
        assert_eq!(state.amount, 1);
        app.teardown();
    }

    #[tokio::test]
    async fn test_unreachable_redis_still_builds() {
        let mut config = JarConfig::default();
        config.store.host = Some("127.0.0.1".into());
        config.store.port = Some(1);
        config.store.connect_timeout_secs = 2;

        let app = Application::build(config).await.unwrap();
        assert!(app.jar().read().await.is_err());

        app.teardown();
        let err = app.jar().read().await.unwrap_err();
        assert_eq!(err.to_string(), "store unavailable: connection closed");
    }
}
