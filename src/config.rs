use std::{env, fs};
use std::time::Duration;
use chrono::NaiveDate;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use crate::models::RetryPolicy;

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

/// Run metadata and the retry policy applied to every step
#[derive(Deserialize)]
pub struct Pipeline {
    pub dag_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub catchup: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Seconds between attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    pub city: String,
}

impl Pipeline {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            delay: Duration::from_secs(self.retry_delay),
        }
    }
}

#[derive(Deserialize)]
pub struct WeatherApiParameters {
    pub http_conn: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_log_response")]
    pub log_response: bool,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    Disabled,
    Directory,
}

#[derive(Deserialize)]
pub struct StorageParameters {
    #[serde(default)]
    pub mode: StorageMode,
    pub bucket: String,
    pub dir: Option<String>,
}

#[derive(Deserialize)]
pub struct MailParameters {
    pub smtp_user: String,
    pub smtp_password: String,
    pub smtp_endpoint: String,
    pub from: String,
    pub to: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub pipeline: Pipeline,
    pub weather_api: WeatherApiParameters,
    pub storage: StorageParameters,
    pub mail: Option<MailParameters>,
}

fn default_schedule() -> String { "@daily".to_string() }
fn default_owner() -> String { "weather_etl".to_string() }
fn default_retries() -> u32 { 2 }
fn default_retry_delay() -> u64 { 120 }
fn default_endpoint() -> String { "/data/2.5/weather".to_string() }
fn default_api_key_env() -> String { "OPENWEATHER_API_KEY".to_string() }
fn default_log_response() -> bool { true }

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, LoadConfigurationError> {
    let toml = fs::read_to_string(config_path)
        .map_err(|e| LoadConfigurationError::ReadError(format!("{}: {}", config_path, e)))?;

    parse_config(&toml)
}

/// Parses configuration from a toml string and resolves the api key
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, LoadConfigurationError> {
    let mut config: Config = toml::from_str(toml)
        .map_err(|e| LoadConfigurationError::ParseError(e.to_string()))?;

    if config.weather_api.api_key.is_empty() {
        config.weather_api.api_key = env::var(&config.weather_api.api_key_env)
            .map_err(|_| LoadConfigurationError::MissingApiKey(config.weather_api.api_key_env.clone()))?;
    }

    if config.storage.mode == StorageMode::Directory && config.storage.dir.is_none() {
        return Err(LoadConfigurationError::MissingStorageDir);
    }

    Ok(config)
}

/// Error depicting errors that occur while loading the configuration
///
#[derive(Debug, Error)]
pub enum LoadConfigurationError {
    #[error("ReadError: {0}")]
    ReadError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("MissingApiKey: api_key not set and environment variable {0} not available")]
    MissingApiKey(String),
    #[error("MissingStorageDir: storage mode 'directory' requires 'dir'")]
    MissingStorageDir,
}
