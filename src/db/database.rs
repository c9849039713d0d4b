use crate::db::error::DatabaseError;
use crate::db::models::{Challenge, LeaderboardEntry, LeaderboardOutcome, Submission};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Database trait defining the store interface for the evaluation pipeline
#[async_trait]
pub trait Database: Send + Sync + 'static {
    /// Look up a challenge by id
    async fn get_challenge(&self, id: Uuid) -> Result<Challenge, DatabaseError>;

    /// Insert a new challenge
    async fn insert_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError>;

    /// Look up a submission by id
    async fn get_submission(&self, id: Uuid) -> Result<Submission, DatabaseError>;

    /// Insert a new submission record
    async fn insert_submission(&self, submission: &Submission) -> Result<(), DatabaseError>;

    /// Overwrite an existing submission record (full-row semantics)
    async fn update_submission(&self, submission: &Submission) -> Result<(), DatabaseError>;

    /// Atomically move a submission into processing status.
    ///
    /// Returns false without writing when the submission is already being
    /// processed, so two racing evaluation runs cannot interleave their
    /// state transitions.
    async fn claim_for_evaluation(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Check whether a non-failed submission with the same content hash
    /// already exists for this user and challenge
    async fn has_duplicate_submission(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        file_hash: &str,
    ) -> Result<bool, DatabaseError>;

    /// List submissions still in pending status, oldest first
    async fn list_pending_submissions(&self, limit: u32) -> Result<Vec<Submission>, DatabaseError>;

    /// Look up the leaderboard entry for a (user, challenge) pair
    async fn get_leaderboard_entry(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> Result<Option<LeaderboardEntry>, DatabaseError>;

    /// Atomically record a completed score on the leaderboard.
    ///
    /// Inserts an entry on the user's first completed evaluation for the
    /// challenge, updates it only when the new score strictly exceeds the
    /// stored best, and leaves it untouched otherwise. The comparison and
    /// write happen in a single statement so racing evaluations cannot
    /// regress the stored best.
    async fn record_best_score(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        score: f64,
        submission_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardOutcome, DatabaseError>;
}

/// Implementation of Database trait for Arc<T> where T implements Database
///
/// This allows sharing database instances across threads and components
/// efficiently.
#[async_trait]
impl<T: Database + ?Sized> Database for Arc<T> {
    async fn get_challenge(&self, id: Uuid) -> Result<Challenge, DatabaseError> {
        (**self).get_challenge(id).await
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError> {
        (**self).insert_challenge(challenge).await
    }

    async fn get_submission(&self, id: Uuid) -> Result<Submission, DatabaseError> {
        (**self).get_submission(id).await
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<(), DatabaseError> {
        (**self).insert_submission(submission).await
    }

    async fn update_submission(&self, submission: &Submission) -> Result<(), DatabaseError> {
        (**self).update_submission(submission).await
    }

    async fn claim_for_evaluation(&self, id: Uuid) -> Result<bool, DatabaseError> {
        (**self).claim_for_evaluation(id).await
    }

    async fn has_duplicate_submission(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        file_hash: &str,
    ) -> Result<bool, DatabaseError> {
        (**self)
            .has_duplicate_submission(user_id, challenge_id, file_hash)
            .await
    }

    async fn list_pending_submissions(&self, limit: u32) -> Result<Vec<Submission>, DatabaseError> {
        (**self).list_pending_submissions(limit).await
    }

    async fn get_leaderboard_entry(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> Result<Option<LeaderboardEntry>, DatabaseError> {
        (**self).get_leaderboard_entry(user_id, challenge_id).await
    }

    async fn record_best_score(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        score: f64,
        submission_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardOutcome, DatabaseError> {
        (**self)
            .record_best_score(user_id, challenge_id, score, submission_id, now)
            .await
    }
}
