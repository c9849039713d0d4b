use crate::db::database::Database;
use crate::db::error::DatabaseError;
use crate::db::models::{
    Challenge, LeaderboardEntry, LeaderboardOutcome, Submission, SubmissionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

/// A PostgreSQL implementation of the Database trait
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    /// Create a new PostgresDatabase with the given connection URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(60))
            .connect_lazy(database_url)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                DatabaseError::ConnectionError(e.to_string())
            })?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            error!("Database connectivity test failed: {}", e);
            return Err(DatabaseError::ConnectionError(format!(
                "Database is not accessible: {}",
                e
            )));
        };

        let db = PostgresDatabase { pool };
        db.initialize_tables().await?;

        info!("PostgreSQL database connection established successfully");
        Ok(db)
    }

    /// Create the pipeline tables and indexes if they do not exist
    async fn initialize_tables(&self) -> Result<(), DatabaseError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS challenges (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                evaluation_metric TEXT NOT NULL,
                ground_truth_url TEXT,
                submission_deadline TIMESTAMPTZ NOT NULL,
                max_file_size_mb INTEGER NOT NULL DEFAULT 100,
                allowed_file_types TEXT[] NOT NULL DEFAULT '{}',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                challenge_id UUID NOT NULL,
                file_name TEXT NOT NULL,
                file_url TEXT NOT NULL,
                file_size_mb DOUBLE PRECISION,
                file_hash TEXT,
                score DOUBLE PRECISION,
                status TEXT NOT NULL DEFAULT 'pending',
                error_message TEXT,
                is_suspicious BOOLEAN NOT NULL DEFAULT FALSE,
                row_count BIGINT,
                submitted_at TIMESTAMPTZ NOT NULL
            )
            "#,
            // Duplicate-hash rejection only applies to non-failed attempts
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS submissions_user_challenge_hash_idx
                ON submissions (user_id, challenge_id, file_hash)
                WHERE status <> 'failed'
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS submissions_status_idx
                ON submissions (status, submitted_at)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS leaderboard (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                challenge_id UUID NOT NULL,
                best_score DOUBLE PRECISION NOT NULL,
                submission_id UUID NOT NULL,
                last_updated TIMESTAMPTZ NOT NULL,
                UNIQUE (user_id, challenge_id)
            )
            "#,
        ];

        for statement in statements {
            debug!("Executing schema statement");
            sqlx::query(statement).execute(&self.pool).await.map_err(|e| {
                error!("Failed to initialize tables: {}", e);
                DatabaseError::QueryError(format!("Failed to initialize tables: {}", e))
            })?;
        }

        Ok(())
    }
}

fn challenge_from_row(row: &PgRow) -> Result<Challenge, DatabaseError> {
    Ok(Challenge {
        id: get(row, "id")?,
        title: get(row, "title")?,
        description: get(row, "description")?,
        evaluation_metric: get(row, "evaluation_metric")?,
        ground_truth_url: get(row, "ground_truth_url")?,
        submission_deadline: get(row, "submission_deadline")?,
        max_file_size_mb: get(row, "max_file_size_mb")?,
        allowed_file_types: get(row, "allowed_file_types")?,
        is_active: get(row, "is_active")?,
        created_at: get(row, "created_at")?,
    })
}

fn submission_from_row(row: &PgRow) -> Result<Submission, DatabaseError> {
    let status: String = get(row, "status")?;
    let status = SubmissionStatus::parse(&status).ok_or_else(|| {
        DatabaseError::DeserializationError(format!("Unknown submission status: {}", status))
    })?;

    Ok(Submission {
        id: get(row, "id")?,
        user_id: get(row, "user_id")?,
        challenge_id: get(row, "challenge_id")?,
        file_name: get(row, "file_name")?,
        file_url: get(row, "file_url")?,
        file_size_mb: get(row, "file_size_mb")?,
        file_hash: get(row, "file_hash")?,
        score: get(row, "score")?,
        status,
        error_message: get(row, "error_message")?,
        is_suspicious: get(row, "is_suspicious")?,
        row_count: get(row, "row_count")?,
        submitted_at: get(row, "submitted_at")?,
    })
}

fn get<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> Result<T, DatabaseError> {
    row.try_get(column)
        .map_err(|e| DatabaseError::DeserializationError(format!("column {}: {}", column, e)))
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn get_challenge(&self, id: Uuid) -> Result<Challenge, DatabaseError> {
        debug!("Fetching challenge {}", id);

        let row = sqlx::query("SELECT * FROM challenges WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        match row {
            Some(row) => challenge_from_row(&row),
            None => Err(DatabaseError::ChallengeNotFound(id)),
        }
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO challenges
                (id, title, description, evaluation_metric, ground_truth_url,
                 submission_deadline, max_file_size_mb, allowed_file_types,
                 is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(challenge.id)
        .bind(&challenge.title)
        .bind(&challenge.description)
        .bind(&challenge.evaluation_metric)
        .bind(&challenge.ground_truth_url)
        .bind(challenge.submission_deadline)
        .bind(challenge.max_file_size_mb)
        .bind(&challenge.allowed_file_types)
        .bind(challenge.is_active)
        .bind(challenge.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(())
    }

    async fn get_submission(&self, id: Uuid) -> Result<Submission, DatabaseError> {
        debug!("Fetching submission {}", id);

        let row = sqlx::query("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        match row {
            Some(row) => submission_from_row(&row),
            None => Err(DatabaseError::SubmissionNotFound(id)),
        }
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO submissions
                (id, user_id, challenge_id, file_name, file_url, file_size_mb,
                 file_hash, score, status, error_message, is_suspicious,
                 row_count, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(submission.id)
        .bind(submission.user_id)
        .bind(submission.challenge_id)
        .bind(&submission.file_name)
        .bind(&submission.file_url)
        .bind(submission.file_size_mb)
        .bind(&submission.file_hash)
        .bind(submission.score)
        .bind(submission.status.as_str())
        .bind(&submission.error_message)
        .bind(submission.is_suspicious)
        .bind(submission.row_count)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(())
    }

    async fn update_submission(&self, submission: &Submission) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE submissions SET
                user_id = $2, challenge_id = $3, file_name = $4, file_url = $5,
                file_size_mb = $6, file_hash = $7, score = $8, status = $9,
                error_message = $10, is_suspicious = $11, row_count = $12,
                submitted_at = $13
            WHERE id = $1
            "#,
        )
        .bind(submission.id)
        .bind(submission.user_id)
        .bind(submission.challenge_id)
        .bind(&submission.file_name)
        .bind(&submission.file_url)
        .bind(submission.file_size_mb)
        .bind(&submission.file_hash)
        .bind(submission.score)
        .bind(submission.status.as_str())
        .bind(&submission.error_message)
        .bind(submission.is_suspicious)
        .bind(submission.row_count)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::SubmissionNotFound(submission.id));
        }
        Ok(())
    }

    async fn claim_for_evaluation(&self, id: Uuid) -> Result<bool, DatabaseError> {
        // Conditional update so a submission already being processed is
        // never claimed twice
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = 'processing', error_message = NULL
            WHERE id = $1 AND status <> 'processing'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn has_duplicate_submission(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        file_hash: &str,
    ) -> Result<bool, DatabaseError> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS present FROM submissions
            WHERE user_id = $1 AND challenge_id = $2 AND file_hash = $3
              AND status <> 'failed'
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(challenge_id)
        .bind(file_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn list_pending_submissions(&self, limit: u32) -> Result<Vec<Submission>, DatabaseError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM submissions
            WHERE status = 'pending'
            ORDER BY submitted_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        rows.iter().map(submission_from_row).collect()
    }

    async fn get_leaderboard_entry(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> Result<Option<LeaderboardEntry>, DatabaseError> {
        let row = sqlx::query(
            "SELECT * FROM leaderboard WHERE user_id = $1 AND challenge_id = $2",
        )
        .bind(user_id)
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(LeaderboardEntry {
                id: get(&row, "id")?,
                user_id: get(&row, "user_id")?,
                challenge_id: get(&row, "challenge_id")?,
                best_score: get(&row, "best_score")?,
                submission_id: get(&row, "submission_id")?,
                last_updated: get(&row, "last_updated")?,
            })),
            None => Ok(None),
        }
    }

    async fn record_best_score(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        score: f64,
        submission_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardOutcome, DatabaseError> {
        // Single-statement ratchet: the WHERE clause on the conflict branch
        // guarantees the stored best can only increase, even under racing
        // evaluations. xmax = 0 distinguishes a fresh insert from an update.
        let row = sqlx::query(
            r#"
            INSERT INTO leaderboard
                (id, user_id, challenge_id, best_score, submission_id, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, challenge_id) DO UPDATE SET
                best_score = EXCLUDED.best_score,
                submission_id = EXCLUDED.submission_id,
                last_updated = EXCLUDED.last_updated
            WHERE leaderboard.best_score < EXCLUDED.best_score
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(challenge_id)
        .bind(score)
        .bind(submission_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        match row {
            None => Ok(LeaderboardOutcome::Unchanged),
            Some(row) => {
                let inserted: bool = get(&row, "inserted")?;
                if inserted {
                    Ok(LeaderboardOutcome::Created)
                } else {
                    Ok(LeaderboardOutcome::Improved)
                }
            }
        }
    }
}
