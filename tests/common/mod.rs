//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use venting_jar::config::JarConfig;
use venting_jar::http::HttpServer;
use venting_jar::jar::Jar;
use venting_jar::lifecycle::Shutdown;
use venting_jar::store::{Command, KvStore, MemoryStore, StoreError, StoreResult};

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve `store` on 127.0.0.1 with an OS-assigned port.
pub async fn start_server(store: Arc<dyn KvStore>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let jar = Jar::new(store, "it");
    let server = HttpServer::new(JarConfig::default(), jar);
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // The listener is already bound; give the accept loop a moment.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

#[allow(dead_code)]
pub async fn start_memory_server() -> TestServer {
    start_server(Arc::new(MemoryStore::new())).await
}

/// Memory store whose operations can be switched to fail.
#[allow(dead_code)]
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Transient("injected failure: connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        self.check()?;
        self.inner.lrange(key, start, stop).await
    }

    async fn exec_atomic(&self, batch: &[Command]) -> StoreResult<()> {
        self.check()?;
        self.inner.exec_atomic(batch).await
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}
