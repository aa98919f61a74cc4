//! Failure injection tests: store errors surface as opaque 500s.

use std::sync::Arc;

use jar_sdk::{ClientError, JarClient};
use reqwest::StatusCode;
use venting_jar::config::{JarConfig, StoreBackend};
use venting_jar::lifecycle::{Application, Shutdown};

mod common;

fn expect_500(result: Result<jar_sdk::JarSnapshot, ClientError>, expected: &str) {
    match result {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, expected);
        }
        other => panic!("expected 500, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_failure_returns_fixed_message() {
    let store = Arc::new(common::FlakyStore::default());
    let server = common::start_server(store.clone()).await;
    let client = JarClient::new(&server.url());

    client.add().await.unwrap();
    store.set_failing(true);

    // The injected cause never leaks to the client.
    expect_500(client.state().await, "Failed to get jar state");
    expect_500(client.add().await, "Failed to update jar");
    expect_500(client.reset().await, "Failed to update jar");

    store.set_failing(false);
    let state = client.state().await.unwrap();
    assert_eq!(state.amount, 1, "failed batches must not apply");
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn test_invalid_action_checked_before_store() {
    let store = Arc::new(common::FlakyStore::default());
    store.set_failing(true);
    let server = common::start_server(store).await;
    let client = JarClient::new(&server.url());

    match client.action("subtract").await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status, StatusCode::BAD_REQUEST),
        other => panic!("expected 400, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_redis_returns_500() {
    let mut config = JarConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.store.backend = StoreBackend::Redis;
    config.store.host = Some("127.0.0.1".to_string());
    config.store.port = Some(1);
    config.store.connect_timeout_secs = 2;

    let app = Application::build(config).await.expect("startup tolerates a down store");
    let listener = app.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move { app.run(listener, &server_shutdown).await });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = JarClient::new(&format!("http://{}", addr));
    expect_500(client.state().await, "Failed to get jar state");
    expect_500(client.add().await, "Failed to update jar");

    shutdown.trigger();
    handle.await.unwrap().unwrap();
}
