//! Error responses.
//!
//! # Design Decisions
//! - Every error body is `{"error": "<message>"}`
//! - Store failures become 500 with a fixed message; the cause is logged
//!   by the handler and never reaches the client
//! - Bad input becomes 400 and names what was wrong

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const READ_FAILED: &str = "Failed to get jar state";
pub const UPDATE_FAILED: &str = "Failed to update jar";

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed body or unknown action.
    InvalidRequest(String),
    /// Store or connection failure, carrying the public message.
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::InvalidRequest(message) => message,
            ApiError::Internal(message) => message.to_string(),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
