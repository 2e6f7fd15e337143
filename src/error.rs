use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("application {0} not found")]
    NotFound(String),

    #[error("unknown status '{0}' (expected applied, interviewing, offer, rejected or accepted)")]
    UnknownStatus(String),

    #[error("{0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to encode records: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
