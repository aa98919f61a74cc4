//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign/propagate request ID)
//!     → handlers.rs (GET/POST /api/jar, GET /health)
//!     → jar accessor
//!     → response.rs (JSON error bodies, status mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer};
