use thiserror::Error;

/// Errors that can occur while extracting prediction values from a file
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("File type {0} is not supported for evaluation")]
    UnsupportedFormat(String),

    #[error("File is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing 'predictions' array in JSON")]
    MissingPredictions,
}

/// Errors that can occur while computing a metric score
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Data length mismatch: submission={submission}, ground_truth={ground_truth}")]
    LengthMismatch { submission: usize, ground_truth: usize },

    #[error("Values must be numeric for {metric} calculation: {value:?}")]
    NonNumericValue { metric: &'static str, value: String },
}
