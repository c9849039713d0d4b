use crate::db::database::Database;
use crate::db::error::DatabaseError;
use crate::db::models::{
    Challenge, LeaderboardEntry, LeaderboardOutcome, Submission, SubmissionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// A fake in-memory implementation of the Database trait for testing
#[derive(Clone)]
pub struct FakeDatabase {
    challenges: Arc<RwLock<HashMap<Uuid, Challenge>>>,
    submissions: Arc<RwLock<HashMap<Uuid, Submission>>>,
    leaderboard: Arc<RwLock<HashMap<(Uuid, Uuid), LeaderboardEntry>>>,
}

impl FakeDatabase {
    /// Create a new empty FakeDatabase
    pub fn new() -> Self {
        FakeDatabase {
            challenges: Arc::new(RwLock::new(HashMap::new())),
            submissions: Arc::new(RwLock::new(HashMap::new())),
            leaderboard: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all stored records
    pub fn fake_clear(&self) {
        self.challenges.write().unwrap().clear();
        self.submissions.write().unwrap().clear();
        self.leaderboard.write().unwrap().clear();
    }
}

impl Default for FakeDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn get_challenge(&self, id: Uuid) -> Result<Challenge, DatabaseError> {
        let challenges = self.challenges.read().unwrap();
        challenges
            .get(&id)
            .cloned()
            .ok_or(DatabaseError::ChallengeNotFound(id))
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError> {
        let mut challenges = self.challenges.write().unwrap();
        challenges.insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn get_submission(&self, id: Uuid) -> Result<Submission, DatabaseError> {
        let submissions = self.submissions.read().unwrap();
        submissions
            .get(&id)
            .cloned()
            .ok_or(DatabaseError::SubmissionNotFound(id))
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<(), DatabaseError> {
        let mut submissions = self.submissions.write().unwrap();
        submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn update_submission(&self, submission: &Submission) -> Result<(), DatabaseError> {
        let mut submissions = self.submissions.write().unwrap();
        if !submissions.contains_key(&submission.id) {
            return Err(DatabaseError::SubmissionNotFound(submission.id));
        }
        submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn claim_for_evaluation(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut submissions = self.submissions.write().unwrap();
        match submissions.get_mut(&id) {
            Some(submission) if submission.status != SubmissionStatus::Processing => {
                submission.status = SubmissionStatus::Processing;
                submission.error_message = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn has_duplicate_submission(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        file_hash: &str,
    ) -> Result<bool, DatabaseError> {
        let submissions = self.submissions.read().unwrap();
        Ok(submissions.values().any(|s| {
            s.user_id == user_id
                && s.challenge_id == challenge_id
                && s.file_hash.as_deref() == Some(file_hash)
                && s.status != SubmissionStatus::Failed
        }))
    }

    async fn list_pending_submissions(&self, limit: u32) -> Result<Vec<Submission>, DatabaseError> {
        let submissions = self.submissions.read().unwrap();
        let mut pending: Vec<Submission> = submissions
            .values()
            .filter(|s| s.status == SubmissionStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|s| s.submitted_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn get_leaderboard_entry(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> Result<Option<LeaderboardEntry>, DatabaseError> {
        let leaderboard = self.leaderboard.read().unwrap();
        Ok(leaderboard.get(&(user_id, challenge_id)).cloned())
    }

    async fn record_best_score(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        score: f64,
        submission_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardOutcome, DatabaseError> {
        // Compare-and-write under a single lock to mirror the atomic
        // upsert of the Postgres implementation
        let mut leaderboard = self.leaderboard.write().unwrap();
        match leaderboard.get_mut(&(user_id, challenge_id)) {
            None => {
                leaderboard.insert(
                    (user_id, challenge_id),
                    LeaderboardEntry {
                        id: Uuid::new_v4(),
                        user_id,
                        challenge_id,
                        best_score: score,
                        submission_id,
                        last_updated: now,
                    },
                );
                Ok(LeaderboardOutcome::Created)
            }
            Some(entry) if entry.best_score < score => {
                entry.best_score = score;
                entry.submission_id = submission_id;
                entry.last_updated = now;
                Ok(LeaderboardOutcome::Improved)
            }
            Some(_) => Ok(LeaderboardOutcome::Unchanged),
        }
    }
}
