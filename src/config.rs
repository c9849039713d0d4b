use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub s3: S3Config,
    pub evaluation: EvaluationConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Number of evaluation worker tasks
    pub workers: usize,
    /// Capacity of the evaluation queue; dispatch reports backpressure when full
    pub queue_depth: usize,
    /// How often the recovery sweep re-enqueues stuck pending submissions
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Rolling log file path; console-only when absent
    pub path: Option<String>,
    /// Maximum size of a single log file in megabytes
    #[serde(default = "default_log_size_mb")]
    pub size: u64,
    /// Number of rotated log files to keep
    #[serde(default = "default_log_max_files")]
    pub max_files: usize,
}

fn default_log_size_mb() -> u64 {
    50
}

fn default_log_max_files() -> usize {
    5
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_text = fs::read_to_string(Path::new(path))?;
    let config: Config = toml::from_str(&config_text)?;
    Ok(config)
}
