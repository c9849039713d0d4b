use crate::db::DatabaseError;
use crate::eval::queue::QueueError;
use crate::scoring::{ExtractError, ScoreError};
use crate::storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the evaluation pipeline.
///
/// Intake-time variants (inactive challenge, deadline, file type, size,
/// duplicate) are reported synchronously to the uploader and leave no
/// submission record. Evaluation-time variants are persisted as a failed
/// status with the error's message.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Ground truth not found for challenge {0}")]
    MissingGroundTruth(Uuid),

    #[error("Challenge is not active")]
    ChallengeInactive,

    #[error("Submission deadline has passed")]
    DeadlinePassed,

    #[error("File type {0} is not allowed for this challenge")]
    FileTypeNotAllowed(String),

    #[error("File size {size_mb:.2}MB exceeds maximum allowed size of {max_mb}MB")]
    FileTooLarge { size_mb: f64, max_mb: i32 },

    #[error("This file has already been submitted")]
    DuplicateSubmission,

    #[error("Row count mismatch: submission has {submitted} rows, expected {expected}")]
    RowCountMismatch { submitted: usize, expected: usize },

    #[error("Submission {0} is already being evaluated")]
    AlreadyProcessing(Uuid),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
