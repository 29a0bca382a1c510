//! Error types for the fallible edges of the arcade (storage, JSON, lookup).
//!
//! Gameplay itself never fails: collisions, lost lives and scoring are plain
//! state transitions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("storage write failed for key `{key}`: {reason}")]
    Storage { key: String, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unknown game `{0}`")]
    UnknownGame(String),
}

pub type ArcadeResult<T> = Result<T, ArcadeError>;
