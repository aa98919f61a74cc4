//! Jar API handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::request::request_id;
use crate::http::response::{ApiError, READ_FAILED, UPDATE_FAILED};
use crate::http::server::AppState;
use crate::jar::{Action, JarState};

/// Body of `POST /api/jar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JarRequest {
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// `GET /api/jar`
pub async fn get_jar(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JarState>, ApiError> {
    let request_id = request_id(&headers);

    match state.jar.read().await {
        Ok(jar) => Ok(Json(jar)),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to get jar state");
            Err(ApiError::Internal(READ_FAILED))
        }
    }
}

/// `POST /api/jar`
pub async fn post_jar(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<JarRequest>, JsonRejection>,
) -> Result<Json<JarState>, ApiError> {
    let request_id = request_id(&headers);

    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(request_id = %request_id, error = %rejection, "Rejected jar request body");
        ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let action = request.action.parse::<Action>().map_err(|e| {
        tracing::warn!(request_id = %request_id, action = %request.action, "Unknown jar action");
        ApiError::InvalidRequest(e.to_string())
    })?;

    tracing::debug!(request_id = %request_id, action = %action, "Applying jar action");

    match state.jar.apply(action).await {
        Ok(jar) => Ok(Json(jar)),
        Err(e) => {
            tracing::error!(request_id = %request_id, action = %action, error = %e, "Failed to update jar");
            Err(ApiError::Internal(UPDATE_FAILED))
        }
    }
}

/// `GET /health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
