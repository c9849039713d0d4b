// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

mod config;
mod db;
mod eval;
mod logging;
mod scoring;
mod storage;
#[cfg(test)]
mod test_utils;

use crate::db::{Database, PostgresDatabase};
use crate::eval::{
    accept_submission, spawn_workers, EvalQueue, Evaluator, NewSubmission, QueueError,
};
use crate::storage::S3Storage;

/// How many stuck pending submissions one recovery sweep re-enqueues
const RECOVERY_BATCH_SIZE: u32 = 100;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the evaluation worker service
    Run,
    /// Evaluate a single submission synchronously (also used to re-evaluate
    /// failed submissions)
    Evaluate {
        /// Submission id to evaluate
        submission_id: Uuid,
    },
    /// Upload a local solution file as a submission and evaluate it
    Submit {
        /// Challenge the file answers
        challenge_id: Uuid,

        /// Id of the submitting user
        #[arg(long)]
        user_id: Uuid,

        /// Path to the solution file
        file: PathBuf,
    },
    /// Manually record a score for a submission, bypassing evaluation
    Rescore {
        /// Submission id to score
        submission_id: Uuid,

        /// Score on the 0-100 scale
        score: f64,

        /// Free-text note recorded in the log
        #[arg(long)]
        notes: Option<String>,

        /// Id of the administrator entering the score
        #[arg(long)]
        evaluator_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config, e);
            process::exit(1);
        }
    };

    let _log_guard = logging::init_logging(config.logging.as_ref())?;
    info!("Submission evaluator v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config);

    let (database, storage) = initialize_backends(&config).await?;
    let evaluator = Arc::new(Evaluator::new(
        Arc::clone(&database),
        Arc::clone(&storage),
    ));

    match cli.command {
        Commands::Run => run_service(config, database, evaluator).await,
        Commands::Evaluate { submission_id } => {
            match evaluator.evaluate(submission_id).await {
                Ok(score) => {
                    info!("Submission {} scored {}", submission_id, score);
                    Ok(())
                }
                Err(e) => {
                    error!("Evaluation failed: {}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Submit {
            challenge_id,
            user_id,
            file,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
                .unwrap_or_default();

            // One-shot mode: the accepted submission is evaluated right here
            // instead of being handed to a worker pool
            let (queue, _receiver) = EvalQueue::new(1);
            let upload = NewSubmission {
                challenge_id,
                user_id,
                file_name,
                data: data.into(),
            };
            let submission_id =
                match accept_submission(database.as_ref(), storage.as_ref(), &queue, upload).await
                {
                    Ok(id) => id,
                    Err(e) => {
                        error!("Submission rejected: {}", e);
                        process::exit(1);
                    }
                };
            info!("Submission {} accepted", submission_id);

            match evaluator.evaluate(submission_id).await {
                Ok(score) => {
                    info!("Submission {} scored {}", submission_id, score);
                    Ok(())
                }
                Err(e) => {
                    error!("Evaluation failed: {}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Rescore {
            submission_id,
            score,
            notes,
            evaluator_id,
        } => {
            evaluator
                .manually_score(submission_id, score, notes.as_deref(), evaluator_id)
                .await
                .context("Manual scoring failed")?;
            Ok(())
        }
    }
}

/// Connect the real database and storage backends
async fn initialize_backends(
    config: &config::Config,
) -> Result<(Arc<PostgresDatabase>, Arc<S3Storage>)> {
    let database = PostgresDatabase::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL database")?;
    let storage = S3Storage::new(&config.s3)
        .await
        .context("Failed to initialize S3 storage")?;

    info!("Backends initialized successfully");
    Ok((Arc::new(database), Arc::new(storage)))
}

/// Run the worker pool plus a periodic recovery sweep until interrupted.
///
/// The sweep re-enqueues submissions still in pending status, which covers
/// both records persisted by an external intake and work lost to a crash
/// before a worker picked it up.
async fn run_service(
    config: config::Config,
    database: Arc<PostgresDatabase>,
    evaluator: Arc<Evaluator<PostgresDatabase, S3Storage>>,
) -> Result<()> {
    let (queue, receiver) = EvalQueue::new(config.evaluation.queue_depth);
    let workers = spawn_workers(config.evaluation.workers, receiver, Arc::clone(&evaluator));
    info!(
        "Started {} evaluation workers (queue depth {})",
        config.evaluation.workers, config.evaluation.queue_depth
    );

    let mut interval = tokio::time::interval(Duration::from_secs(
        config.evaluation.poll_interval_seconds,
    ));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = sweep_pending(&database, &queue).await {
                    error!("Recovery sweep failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Dropping the queue closes the channel; workers drain and exit
    drop(queue);
    for worker in workers {
        let _ = worker.await;
    }

    info!("All evaluation workers stopped");
    Ok(())
}

/// Re-enqueue submissions that are still pending
async fn sweep_pending(database: &PostgresDatabase, queue: &EvalQueue) -> Result<()> {
    let pending = database
        .list_pending_submissions(RECOVERY_BATCH_SIZE)
        .await?;

    if pending.is_empty() {
        return Ok(());
    }

    info!("Recovery sweep found {} pending submissions", pending.len());
    for submission in pending {
        match queue.dispatch(submission.id) {
            Ok(()) => {}
            Err(QueueError::Full) => {
                warn!("Evaluation queue is full, deferring remaining pending submissions");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
