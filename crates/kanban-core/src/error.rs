use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KanbanError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend refused a reorder. Nothing from the batch was applied.
    #[error("Reorder rejected: {0}")]
    Rejected(String),

    #[error("Backend did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type KanbanResult<T> = Result<T, KanbanError>;

impl From<serde_json::Error> for KanbanError {
    fn from(err: serde_json::Error) -> Self {
        KanbanError::Serialization(err.to_string())
    }
}

impl KanbanError {
    /// Whether this error came back from the persistence backend as opposed
    /// to a local validation problem.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            KanbanError::Rejected(_) | KanbanError::Timeout(_) | KanbanError::Io(_)
        )
    }
}
