//! Venting jar service library.

pub mod config;
pub mod http;
pub mod jar;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;

pub use config::schema::JarConfig;
pub use http::HttpServer;
pub use jar::{Jar, JarState};
pub use lifecycle::{Application, Shutdown};
