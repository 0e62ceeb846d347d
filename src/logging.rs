use std::path::Path;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use thiserror::Error;

const LOG_FILE: &str = "weather_etl.log";
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {M} - {m}{n}";
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const KEEP_LOGS: u32 = 5;

/// Sets up the global logger with a size rolled log file and optionally stdout
///
/// # Arguments
///
/// * 'log_path' - directory to put log files in
/// * 'log_level' - max level to log
/// * 'log_to_stdout' - whether to also log to stdout
pub fn setup_logger(log_path: &str, log_level: LevelFilter, log_to_stdout: bool) -> Result<Handle, LoggerError> {
    let config = build_config(Path::new(log_path), log_level, log_to_stdout)?;

    log4rs::init_config(config).map_err(|e| LoggerError(e.to_string()))
}

fn build_config(log_dir: &Path, log_level: LevelFilter, log_to_stdout: bool) -> Result<Config, LoggerError> {
    let log_file = log_dir.join(LOG_FILE);
    let archive = log_dir.join(format!("{}.{{}}", LOG_FILE));

    let roller = FixedWindowRoller::builder()
        .build(&archive.display().to_string(), KEEP_LOGS)
        .map_err(|e| LoggerError(format!("roller: {}", e)))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(MAX_LOG_SIZE)), Box::new(roller));

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(&log_file, Box::new(policy))
        .map_err(|e| LoggerError(format!("{}: {}", log_file.display(), e)))?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    builder
        .build(root.build(log_level))
        .map_err(|e| LoggerError(e.to_string()))
}

/// Error depicting errors that occur while setting up logging
///
#[derive(Debug, Error)]
#[error("LoggerError: {0}")]
pub struct LoggerError(pub String);
