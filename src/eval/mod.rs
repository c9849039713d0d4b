pub mod error;
pub mod evaluator;
pub mod guard;
pub mod intake;
pub mod queue;

pub use evaluator::Evaluator;
pub use intake::{accept_submission, NewSubmission};
pub use queue::{spawn_workers, EvalQueue, QueueError};
