use crate::db::Database;
use crate::eval::error::EvalError;
use crate::eval::evaluator::Evaluator;
use crate::storage::Storage;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Errors that can occur when dispatching work to the evaluation queue
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Evaluation queue is full")]
    Full,

    #[error("Evaluation queue is closed")]
    Closed,
}

/// Bounded handoff from submission intake to the evaluation workers.
///
/// Dispatch never blocks the caller; a full queue is surfaced as
/// backpressure instead of spawning unbounded background tasks.
#[derive(Clone)]
pub struct EvalQueue {
    sender: mpsc::Sender<Uuid>,
}

/// Receiving end of the queue, shared by the worker pool
pub type EvalReceiver = mpsc::Receiver<Uuid>;

impl EvalQueue {
    /// Create a queue with the given capacity
    pub fn new(depth: usize) -> (Self, EvalReceiver) {
        let (sender, receiver) = mpsc::channel(depth);
        (EvalQueue { sender }, receiver)
    }

    /// Enqueue a submission for background evaluation
    pub fn dispatch(&self, submission_id: Uuid) -> Result<(), QueueError> {
        self.sender.try_send(submission_id).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

/// Spawn a fixed pool of evaluation workers draining the queue.
///
/// Workers run until the queue's senders are dropped. A hung evaluation
/// blocks only its own worker; the rest of the pool keeps draining.
pub fn spawn_workers<D: Database, S: Storage>(
    count: usize,
    receiver: EvalReceiver,
    evaluator: Arc<Evaluator<D, S>>,
) -> Vec<JoinHandle<()>> {
    let receiver = Arc::new(Mutex::new(receiver));

    (0..count)
        .map(|worker_id| {
            let receiver = Arc::clone(&receiver);
            let evaluator = Arc::clone(&evaluator);

            tokio::spawn(async move {
                debug!("Evaluation worker {} started", worker_id);
                loop {
                    // Hold the lock only while waiting for the next id so
                    // other workers can take work as soon as it arrives
                    let next = { receiver.lock().await.recv().await };
                    let Some(submission_id) = next else { break };

                    debug!(
                        "Worker {} picked up submission {}",
                        worker_id, submission_id
                    );
                    match evaluator.evaluate(submission_id).await {
                        Ok(score) => {
                            info!(
                                "Worker {} completed submission {} with score {}",
                                worker_id, submission_id, score
                            );
                        }
                        Err(EvalError::AlreadyProcessing(_)) => {
                            debug!(
                                "Worker {} skipped submission {}: already in flight",
                                worker_id, submission_id
                            );
                        }
                        Err(e) => {
                            error!(
                                "Worker {} failed to evaluate submission {}: {}",
                                worker_id, submission_id, e
                            );
                        }
                    }
                }
                debug!("Evaluation worker {} shutting down", worker_id);
            })
        })
        .collect()
}
