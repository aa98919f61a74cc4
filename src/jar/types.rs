//! Jar state, actions and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Most history entries kept, newest first.
pub const HISTORY_LIMIT: usize = 5;

/// Snapshot of the jar as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JarState {
    /// Dollars in the jar.
    pub amount: u64,
    /// Recent events, newest first, at most [`HISTORY_LIMIT`].
    pub history: Vec<String>,
}

/// Mutation requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Reset,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Reset => "reset",
        }
    }

    /// Event text recorded in history for this action.
    pub fn description(&self) -> &'static str {
        match self {
            Action::Add => "Added $1 to the jar",
            Action::Reset => "Jar was reset to $0",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = JarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Action::Add),
            "reset" => Ok(Action::Reset),
            other => Err(JarError::InvalidAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the jar accessor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JarError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Action name outside `add` / `reset`. Nothing was written.
    #[error("unknown action '{0}'")]
    InvalidAction(String),
}

pub type JarResult<T> = Result<T, JarError>;
