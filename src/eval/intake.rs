use crate::db::{Database, Submission, SubmissionStatus};
use crate::eval::error::EvalError;
use crate::eval::guard;
use crate::eval::queue::EvalQueue;
use crate::storage::Storage;
use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// An uploaded solution file, not yet validated or stored
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub challenge_id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub data: Bytes,
}

/// Validate and accept an uploaded submission, then hand it to the
/// evaluation queue.
///
/// Rejections (inactive challenge, missed deadline, disallowed type,
/// oversized file, duplicate content) happen before any storage or
/// database write, so a rejected upload leaves no trace. The caller gets
/// the new submission id back immediately; scoring runs in the background.
pub async fn accept_submission<D: Database, S: Storage>(
    db: &D,
    storage: &S,
    queue: &EvalQueue,
    upload: NewSubmission,
) -> Result<Uuid, EvalError> {
    let challenge = db.get_challenge(upload.challenge_id).await?;

    if !challenge.is_active {
        return Err(EvalError::ChallengeInactive);
    }
    if Utc::now() > challenge.submission_deadline {
        return Err(EvalError::DeadlinePassed);
    }

    let extension = crate::scoring::extension_of(&upload.file_name).to_lowercase();
    if !challenge.allowed_file_types.is_empty()
        && !challenge
            .allowed_file_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(EvalError::FileTypeNotAllowed(extension));
    }

    let size_mb = upload.data.len() as f64 / (1024.0 * 1024.0);
    if size_mb > challenge.max_file_size_mb as f64 {
        return Err(EvalError::FileTooLarge {
            size_mb,
            max_mb: challenge.max_file_size_mb,
        });
    }

    let file_hash = guard::file_sha256(&upload.data);
    guard::ensure_not_duplicate(db, upload.user_id, upload.challenge_id, &file_hash).await?;

    let submission_id = Uuid::new_v4();
    let stored_key = format!(
        "{}/{}/{}{}",
        upload.user_id, upload.challenge_id, submission_id, extension
    );
    storage.put_object(&stored_key, upload.data).await?;

    let submission = Submission {
        id: submission_id,
        user_id: upload.user_id,
        challenge_id: upload.challenge_id,
        file_name: upload.file_name,
        file_url: stored_key,
        file_size_mb: Some(size_mb),
        file_hash: Some(file_hash),
        score: None,
        status: SubmissionStatus::Pending,
        error_message: None,
        is_suspicious: false,
        row_count: None,
        submitted_at: Utc::now(),
    };
    db.insert_submission(&submission).await?;

    info!(
        "Submission {} created for user {} on challenge {}",
        submission_id, upload.user_id, upload.challenge_id
    );

    queue.dispatch(submission_id)?;
    Ok(submission_id)
}
