//! Client SDK for the venting jar API.

pub mod client;

pub use client::{ClientError, JarClient, JarSnapshot};
