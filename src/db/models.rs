use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a submission through the evaluation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Accepted at intake, waiting for a worker
    Pending,
    /// Claimed by an evaluation run
    Processing,
    /// Scored (automatically or manually)
    Completed,
    /// Evaluation aborted; see error_message
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Processing => "processing",
            SubmissionStatus::Completed => "completed",
            SubmissionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubmissionStatus::Pending),
            "processing" => Some(SubmissionStatus::Processing),
            "completed" => Some(SubmissionStatus::Completed),
            "failed" => Some(SubmissionStatus::Failed),
            _ => None,
        }
    }
}

/// A scored competition with a deadline and, once set, a hidden ground truth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Metric name resolved by the scoring registry; unknown names fall
    /// back to accuracy
    pub evaluation_metric: String,
    /// Object-storage key of the answer file; evaluation requires it
    pub ground_truth_url: Option<String>,
    pub submission_deadline: DateTime<Utc>,
    pub max_file_size_mb: i32,
    pub allowed_file_types: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One user's uploaded candidate-answer file for a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub file_name: String,
    /// Object-storage key of the uploaded file
    pub file_url: String,
    pub file_size_mb: Option<f64>,
    /// Hex-encoded SHA-256 of the uploaded bytes
    pub file_hash: Option<String>,
    /// 0-100 scale, 2 decimal places; absent until evaluated
    pub score: Option<f64>,
    pub status: SubmissionStatus,
    pub error_message: Option<String>,
    pub is_suspicious: bool,
    pub row_count: Option<i64>,
    pub submitted_at: DateTime<Utc>,
}

/// Best score achieved so far by a user on a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub best_score: f64,
    /// The submission that achieved best_score
    pub submission_id: Uuid,
    pub last_updated: DateTime<Utc>,
}

/// Result of a leaderboard ratchet attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardOutcome {
    /// First completed evaluation for this (user, challenge) pair
    Created,
    /// New score strictly exceeded the stored best
    Improved,
    /// Stored best was equal or better; nothing written
    Unchanged,
}
