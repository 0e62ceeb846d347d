use std::env;
use log::info;
use thiserror::Error;
use crate::config::{load_config, Config, LoadConfigurationError};
use crate::logging::{setup_logger, LoggerError};
use crate::manager_mail::{Mail, MailError};
use crate::manager_storage::Sink;
use crate::manager_weather::{WeatherApi, WeatherApiError};

pub struct Mgr {
    pub weather: WeatherApi,
    pub sink: Sink,
    pub mail: Option<Mail>,
}

/// Initializes and returns configuration and a Mgr struct holding various of initialized structs
///
pub fn init() -> Result<(Config, Mgr), InitializationError> {
    let args: Vec<String> = env::args().collect();
    let config_path = config_path_from_args(&args)
        .ok_or(InitializationError::ArgumentError("expected --config=<path>".to_string()))?;

    // Load configuration
    let config = load_config(config_path)?;

    // Setup logging
    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    // Print version
    info!("starting weather etl version: {}", env!("CARGO_PKG_VERSION"));
    info!("pipeline: {} ({}), schedule: {}, owner: {}, tags: [{}]",
        config.pipeline.dag_id,
        config.pipeline.description,
        config.pipeline.schedule,
        config.pipeline.owner,
        config.pipeline.tags.join(", "));
    if let Some(start_date) = config.pipeline.start_date {
        info!("start date: {}, catchup: {}", start_date, config.pipeline.catchup);
    }

    // Instantiate structs
    let weather = WeatherApi::new(&config.weather_api, &config.pipeline.city)?;
    let sink = Sink::new(&config.storage);
    let mail = match &config.mail {
        Some(m) => Some(Mail::new(m)?),
        None => None,
    };

    let mgr = Mgr {
        weather,
        sink,
        mail,
    };

    Ok((config, mgr))
}

/// Picks the configuration file path out of the command line arguments
///
/// # Arguments
///
/// * 'args' - command line arguments
fn config_path_from_args(args: &[String]) -> Option<&str> {
    args.iter()
        .find_map(|a| a.strip_prefix("--config="))
        .filter(|p| !p.is_empty())
}

/// Error depicting errors that occur while initializing the pipeline
///
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("ArgumentError: {0}")]
    ArgumentError(String),
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("SetupLoggerError: {0}")]
    SetupLoggerError(#[from] LoggerError),
    #[error("WeatherApiSetupError: {0}")]
    WeatherApiSetupError(#[from] WeatherApiError),
    #[error("MailSetupError: {0}")]
    MailSetupError(#[from] MailError),
}
