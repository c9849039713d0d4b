pub mod error;
pub mod extract;
pub mod metric;

pub use error::{ExtractError, ScoreError};
pub use extract::{extension_of, extract_values, FileFormat};
pub use metric::Metric;
