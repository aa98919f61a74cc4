//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::time::Duration;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::JarConfig;
use crate::http::handlers::{get_jar, health, post_jar};
use crate::http::middleware::track_metrics;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::jar::Jar;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub jar: Jar,
}

/// HTTP server for the jar API.
pub struct HttpServer {
    router: Router,
    config: JarConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `jar`.
    pub fn new(config: JarConfig, jar: Jar) -> Self {
        let state = AppState { jar };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &JarConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/jar", get(get_jar).post(post_jar))
            .route("/health", get(health))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &JarConfig {
        &self.config
    }
}
