//! Domain error type shared by the tracker, the REST API, and the MCP tools.

use thiserror::Error;

use crate::progression::skills::SpendError;

/// Errors surfaced by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("not enough skill points: need {needed}, have {available}")]
    InsufficientSkillPoints { needed: i64, available: i64 },

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("please wait {retry_after_secs}s before generating more tasks")]
    RateLimited { retry_after_secs: u64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A background task panicked or the connection lock was poisoned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

impl From<SpendError> for TrackerError {
    fn from(err: SpendError) -> Self {
        match err {
            SpendError::Insufficient { needed, available } => {
                Self::InsufficientSkillPoints { needed, available }
            }
            SpendError::Invalid(message) => Self::Invalid(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
