use crate::scoring::error::ScoreError;

/// The closed set of evaluation metrics a challenge can configure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy,
    F1,
    MeanSquaredError,
    MeanAbsoluteError,
    RootMeanSquaredError,
}

impl Metric {
    /// Resolve a configured metric name.
    ///
    /// Unrecognized names fall back to accuracy; this is the documented
    /// default for challenges with a misconfigured metric, not an error.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "accuracy" => Metric::Accuracy,
            "f1" | "f1-score" => Metric::F1,
            "mse" | "mean-squared-error" => Metric::MeanSquaredError,
            "mae" | "mean-absolute-error" => Metric::MeanAbsoluteError,
            "rmse" | "root-mean-squared-error" => Metric::RootMeanSquaredError,
            _ => Metric::Accuracy,
        }
    }

    /// Score a submission against ground truth on a 0-100 scale, higher is
    /// better regardless of the underlying metric. Both sequences must have
    /// the same length.
    pub fn score(&self, submission: &[String], ground_truth: &[String]) -> Result<f64, ScoreError> {
        if submission.len() != ground_truth.len() {
            return Err(ScoreError::LengthMismatch {
                submission: submission.len(),
                ground_truth: ground_truth.len(),
            });
        }

        // Nothing to compare scores zero for every metric
        if submission.is_empty() {
            return Ok(0.0);
        }

        match self {
            Metric::Accuracy => Ok(accuracy(submission, ground_truth)),
            Metric::F1 => Ok(f1_score(submission, ground_truth)),
            Metric::MeanSquaredError => {
                let mse = mean_error(submission, ground_truth, "MSE", |d| d * d)?;
                Ok(error_to_score(mse))
            }
            Metric::MeanAbsoluteError => {
                let mae = mean_error(submission, ground_truth, "MAE", f64::abs)?;
                Ok(error_to_score(mae))
            }
            Metric::RootMeanSquaredError => {
                let mse = mean_error(submission, ground_truth, "RMSE", |d| d * d)?;
                Ok(error_to_score(mse.sqrt()))
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map an error statistic to a bounded score: zero error gives 100 and the
/// score decays toward 0 as the error grows, independent of scale
fn error_to_score(error: f64) -> f64 {
    round2(100.0 * (-error).exp())
}

/// Fraction of positions with a case-insensitive exact match, times 100
fn accuracy(submission: &[String], ground_truth: &[String]) -> f64 {
    if submission.is_empty() {
        return 0.0;
    }

    let correct = submission
        .iter()
        .zip(ground_truth)
        .filter(|(predicted, actual)| predicted.eq_ignore_ascii_case(actual))
        .count();

    round2(correct as f64 / submission.len() as f64 * 100.0)
}

/// F1 over binary "1"/"0" labels. Values outside {"0", "1"} do not
/// increment any counter.
fn f1_score(submission: &[String], ground_truth: &[String]) -> f64 {
    let mut true_positives = 0u64;
    let mut false_positives = 0u64;
    let mut false_negatives = 0u64;

    for (predicted, actual) in submission.iter().zip(ground_truth) {
        match (predicted.trim(), actual.trim()) {
            ("1", "1") => true_positives += 1,
            ("1", "0") => false_positives += 1,
            ("0", "1") => false_negatives += 1,
            _ => {}
        }
    }

    if true_positives == 0 {
        return 0.0;
    }

    let precision = true_positives as f64 / (true_positives + false_positives) as f64;
    let recall = true_positives as f64 / (true_positives + false_negatives) as f64;
    let f1 = 2.0 * (precision * recall) / (precision + recall) * 100.0;

    round2(f1)
}

/// Mean of a per-position error term over numerically parsed values
fn mean_error(
    submission: &[String],
    ground_truth: &[String],
    metric: &'static str,
    term: impl Fn(f64) -> f64,
) -> Result<f64, ScoreError> {
    let mut sum = 0.0;

    for (predicted, actual) in submission.iter().zip(ground_truth) {
        let predicted = parse_numeric(predicted, metric)?;
        let actual = parse_numeric(actual, metric)?;
        sum += term(predicted - actual);
    }

    Ok(sum / submission.len() as f64)
}

fn parse_numeric(value: &str, metric: &'static str) -> Result<f64, ScoreError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ScoreError::NonNumericValue {
            metric,
            value: value.to_string(),
        })
}
