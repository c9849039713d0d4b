use crate::db::Database;
use crate::eval::error::EvalError;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

/// Scores at or above this value are flagged for manual review
pub const SUSPICIOUS_SCORE_THRESHOLD: f64 = 99.5;

/// Hex-encoded SHA-256 digest of the file contents
pub fn file_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Reject a resubmission of byte-identical content by the same user for the
/// same challenge. Failed attempts do not count; the same file may be
/// retried after a failure.
pub async fn ensure_not_duplicate<D: Database>(
    db: &D,
    user_id: Uuid,
    challenge_id: Uuid,
    file_hash: &str,
) -> Result<(), EvalError> {
    if db
        .has_duplicate_submission(user_id, challenge_id, file_hash)
        .await?
    {
        return Err(EvalError::DuplicateSubmission);
    }
    Ok(())
}

/// The submission must contain exactly as many rows as the ground truth
pub fn check_row_parity(submitted: usize, expected: usize) -> Result<(), EvalError> {
    if submitted != expected {
        return Err(EvalError::RowCountMismatch {
            submitted,
            expected,
        });
    }
    Ok(())
}

/// Flag near-perfect scores for human review; does not block completion
pub fn flag_suspicious_score(submission_id: Uuid, score: f64) -> bool {
    let suspicious = score >= SUSPICIOUS_SCORE_THRESHOLD;
    if suspicious {
        warn!(
            "Suspicious score detected for submission {}: {}% (flagged for manual review)",
            submission_id, score
        );
    }
    suspicious
}
