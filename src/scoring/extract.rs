use crate::scoring::error::ExtractError;
use serde_json::Value;

/// Supported submission file formats, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Txt,
}

impl FileFormat {
    /// Resolve a format from a file extension such as ".csv".
    ///
    /// Unknown extensions are an error; unlike metric names there is no
    /// default format to fall back to.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractError> {
        match extension.to_lowercase().as_str() {
            ".csv" => Ok(FileFormat::Csv),
            ".json" => Ok(FileFormat::Json),
            ".txt" => Ok(FileFormat::Txt),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// The extension of a file name, dot included, or "" when there is none
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}

/// Ordered prediction values pulled out of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub values: Vec<String>,
    pub row_count: usize,
}

/// Extract an ordered sequence of prediction values from raw file bytes.
///
/// Pure and deterministic: the same bytes always produce the same values
/// and row count.
pub fn extract_values(data: &[u8], format: FileFormat) -> Result<Extraction, ExtractError> {
    match format {
        FileFormat::Csv => extract_csv(data),
        FileFormat::Json => extract_json(data),
        FileFormat::Txt => extract_txt(data),
    }
}

fn decode_utf8(data: &[u8]) -> Result<&str, ExtractError> {
    std::str::from_utf8(data).map_err(|e| ExtractError::InvalidEncoding(e.to_string()))
}

/// CSV: skip the header line, take the last comma-separated field of each
/// remaining non-empty line
fn extract_csv(data: &[u8]) -> Result<Extraction, ExtractError> {
    let text = decode_utf8(data)?;
    let values: Vec<String> = text
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .map(|line| {
            line.rsplit(',')
                .next()
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .collect();

    let row_count = values.len();
    Ok(Extraction { values, row_count })
}

/// JSON: a single object with a top-level "predictions" array; each
/// element's string rendering is a value
fn extract_json(data: &[u8]) -> Result<Extraction, ExtractError> {
    let root: Value =
        serde_json::from_slice(data).map_err(|e| ExtractError::InvalidJson(e.to_string()))?;

    let predictions = root
        .get("predictions")
        .and_then(Value::as_array)
        .ok_or(ExtractError::MissingPredictions)?;

    let values: Vec<String> = predictions
        .iter()
        .map(|v| match v {
            // Strings render without their JSON quotes
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    let row_count = values.len();
    Ok(Extraction { values, row_count })
}

/// TXT: every non-empty line, trimmed; no header
fn extract_txt(data: &[u8]) -> Result<Extraction, ExtractError> {
    let text = decode_utf8(data)?;
    let values: Vec<String> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let row_count = values.len();
    Ok(Extraction { values, row_count })
}
