use crate::db::{Database, Submission, SubmissionStatus};
use crate::eval::error::EvalError;
use crate::eval::guard;
use crate::scoring::{extension_of, extract_values, FileFormat, Metric};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Drives a submission through the evaluation state machine:
/// pending -> processing -> completed | failed.
///
/// Completed and failed are terminal per attempt; re-running evaluate on a
/// finished submission starts a fresh attempt that overwrites score, status
/// and error message.
pub struct Evaluator<D: Database, S: Storage> {
    db: Arc<D>,
    storage: Arc<S>,
}

impl<D: Database, S: Storage> Evaluator<D, S> {
    pub fn new(db: Arc<D>, storage: Arc<S>) -> Self {
        Evaluator { db, storage }
    }

    /// Evaluate a submission end to end, returning the computed score.
    ///
    /// The processing status is persisted before any I/O so a crash leaves
    /// a visibly stuck record instead of a silently retried pending one.
    /// Any failure after the claim is persisted as status=failed with the
    /// error's message and returned to the caller; the leaderboard is only
    /// touched on success.
    pub async fn evaluate(&self, submission_id: Uuid) -> Result<f64, EvalError> {
        let mut submission = self.db.get_submission(submission_id).await?;

        if !self.db.claim_for_evaluation(submission_id).await? {
            return Err(EvalError::AlreadyProcessing(submission_id));
        }
        submission.status = SubmissionStatus::Processing;
        submission.error_message = None;

        info!("Starting evaluation for submission {}", submission_id);

        match self.run_scoring(&mut submission).await {
            Ok(score) => {
                submission.score = Some(score);
                submission.status = SubmissionStatus::Completed;
                self.db.update_submission(&submission).await?;

                let outcome = self
                    .db
                    .record_best_score(
                        submission.user_id,
                        submission.challenge_id,
                        score,
                        submission.id,
                        chrono::Utc::now(),
                    )
                    .await?;
                debug!(
                    "Leaderboard outcome for user {} on challenge {}: {:?}",
                    submission.user_id, submission.challenge_id, outcome
                );

                info!(
                    "Submission {} evaluated with score: {}",
                    submission_id, score
                );
                Ok(score)
            }
            Err(e) => {
                error!("Error evaluating submission {}: {}", submission_id, e);
                self.mark_failed(submission_id, &e).await;
                Err(e)
            }
        }
    }

    /// The ordered scoring steps between claiming and persisting the result
    async fn run_scoring(&self, submission: &mut Submission) -> Result<f64, EvalError> {
        let challenge = self.db.get_challenge(submission.challenge_id).await?;

        let ground_truth_url = challenge
            .ground_truth_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(EvalError::MissingGroundTruth(challenge.id))?;

        let submission_data = self.storage.get_object(&submission.file_url).await?;
        let ground_truth_data = self.storage.get_object(ground_truth_url).await?;

        submission.file_hash = Some(guard::file_sha256(&submission_data));

        // Both files are read with the submission's declared extension
        let format = FileFormat::from_extension(extension_of(&submission.file_name))?;
        let submitted = extract_values(&submission_data, format)?;
        let expected = extract_values(&ground_truth_data, format)?;

        submission.row_count = Some(submitted.row_count as i64);
        guard::check_row_parity(submitted.row_count, expected.row_count)?;

        let metric = Metric::parse(&challenge.evaluation_metric);
        let score = metric.score(&submitted.values, &expected.values)?;

        submission.is_suspicious = guard::flag_suspicious_score(submission.id, score);

        Ok(score)
    }

    /// Persist the failed status and error message on a freshly loaded copy
    /// of the record; partial mutations from the aborted attempt are dropped
    async fn mark_failed(&self, submission_id: Uuid, cause: &EvalError) {
        match self.db.get_submission(submission_id).await {
            Ok(mut submission) => {
                submission.status = SubmissionStatus::Failed;
                submission.error_message = Some(cause.to_string());
                if let Err(e) = self.db.update_submission(&submission).await {
                    error!(
                        "Failed to persist failed status for submission {}: {}",
                        submission_id, e
                    );
                }
            }
            Err(e) => error!(
                "Failed to reload submission {} after evaluation error: {}",
                submission_id, e
            ),
        }
    }

    /// Administrative score entry: records the score and completes the
    /// submission without extraction, hashing or a leaderboard update.
    pub async fn manually_score(
        &self,
        submission_id: Uuid,
        score: f64,
        notes: Option<&str>,
        evaluator_id: Uuid,
    ) -> Result<(), EvalError> {
        let mut submission = self.db.get_submission(submission_id).await?;

        submission.score = Some(score);
        submission.status = SubmissionStatus::Completed;
        self.db.update_submission(&submission).await?;

        info!(
            "Submission {} manually scored by {} with score: {}{}",
            submission_id,
            evaluator_id,
            score,
            notes.map(|n| format!(" ({})", n)).unwrap_or_default()
        );
        Ok(())
    }
}
