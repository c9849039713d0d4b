pub mod database;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod models;
pub mod postgres;

pub use database::Database;
pub use error::DatabaseError;
pub use models::{Submission, SubmissionStatus};
pub use postgres::PostgresDatabase;
