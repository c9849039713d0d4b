use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with the database
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String),

    #[error("Query execution failed: {0}")]
    QueryError(String),

    #[error("Failed to deserialize database row: {0}")]
    DeserializationError(String),

    #[error("Challenge {0} not found")]
    ChallengeNotFound(Uuid),

    #[error("Submission {0} not found")]
    SubmissionNotFound(Uuid),

    #[error("Other database error: {0}")]
    Other(#[from] anyhow::Error),
}
