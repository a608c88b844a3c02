//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file (default "logs/ingl.log")
//!
//! Stdout logging writes to stderr so command output stays clean.

use chrono::Utc;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, File},
    io,
    path::Path,
};

use crate::constants::{DEFAULT_LOG_FILE_PATH, DEFAULT_LOG_LEVEL, DEFAULT_LOG_MODE};

pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Appends the UTC date to the base log file name.
pub fn rolled_file_path(base_file_path: &str, date_str: &str) -> String {
    match base_file_path.strip_suffix(".log") {
        Some(trimmed) => format!("{}-{}.log", trimmed, date_str),
        None => format!("{}-{}.log", base_file_path, date_str),
    }
}

/// Installs the global logger. `level_override` (from `--log-level`) wins over `LOG_LEVEL`.
pub fn setup_logging(level_override: Option<&str>) -> io::Result<()> {
    let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| DEFAULT_LOG_MODE.to_string());
    let log_level = match level_override {
        Some(level) => level.to_string(),
        None => env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
    };
    let level_filter = parse_level(&log_level);

    let init_result = if log_mode.to_lowercase() == "file" {
        let base_file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE_PATH.to_string());
        let date_str = Utc::now().format("%Y-%m-%d").to_string();
        let rolled_file_path = rolled_file_path(&base_file_path, &date_str);

        if let Some(parent) = Path::new(&rolled_file_path).parent() {
            create_dir_all(parent)?;
        }
        let log_file = File::create(&rolled_file_path)?;
        WriteLogger::init(level_filter, Config::default(), log_file)
    } else {
        WriteLogger::init(level_filter, Config::default(), io::stderr())
    };
    init_result.map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    info!("Logging is successfully configured (mode: {})", log_mode);
    Ok(())
}
