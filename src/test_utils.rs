use crate::db::models::{Challenge, Submission, SubmissionStatus};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Check if a test is enabled via environment variable
fn is_test_enabled(env_var: &str) -> bool {
    std::env::var(env_var)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Check if Postgres-backed tests are enabled via environment variable
#[allow(dead_code)]
pub fn is_db_enabled() -> bool {
    is_test_enabled("ENABLE_DB_TESTS")
}

/// Check if S3-backed tests are enabled via environment variable
#[allow(dead_code)]
pub fn is_s3_enabled() -> bool {
    is_test_enabled("ENABLE_S3_TESTS")
}

/// Creates an active test challenge scored by the given metric, with an
/// open deadline and no file-type restrictions
pub fn create_test_challenge(metric: &str, ground_truth_url: Option<&str>) -> Challenge {
    Challenge {
        id: Uuid::new_v4(),
        title: "Test challenge".to_string(),
        description: None,
        evaluation_metric: metric.to_string(),
        ground_truth_url: ground_truth_url.map(str::to_string),
        submission_deadline: Utc::now() + Duration::days(7),
        max_file_size_mb: 100,
        allowed_file_types: Vec::new(),
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Creates a pending test submission pointing at the given stored file
pub fn create_test_submission(
    user_id: Uuid,
    challenge_id: Uuid,
    file_name: &str,
    file_url: &str,
) -> Submission {
    Submission {
        id: Uuid::new_v4(),
        user_id,
        challenge_id,
        file_name: file_name.to_string(),
        file_url: file_url.to_string(),
        file_size_mb: Some(0.01),
        file_hash: None,
        score: None,
        status: SubmissionStatus::Pending,
        error_message: None,
        is_suspicious: false,
        row_count: None,
        submitted_at: Utc::now(),
    }
}
