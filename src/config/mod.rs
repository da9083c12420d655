//! Configuration module for the scheduler backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// How many Sundays the schedule view lists by default
    pub upcoming_sundays: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("SCHEDULER_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("SCHEDULER_DB_PATH")
            .unwrap_or_else(|_| "./data/scheduler.sqlite".to_string())
            .into();

        let bind_addr = env::var("SCHEDULER_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid SCHEDULER_BIND_ADDR: {}", e)))?;

        let log_level = env::var("SCHEDULER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("SCHEDULER_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value).ok_or_else(|| {
                AppError::Internal(format!("Invalid SCHEDULER_LOG_FORMAT: {}", value))
            })?,
            Err(_) => LogFormat::Pretty,
        };

        let upcoming_sundays = match env::var("SCHEDULER_UPCOMING_SUNDAYS") {
            Ok(value) => value.parse().map_err(|e| {
                AppError::Internal(format!("Invalid SCHEDULER_UPCOMING_SUNDAYS: {}", e))
            })?,
            Err(_) => 16,
        };

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_format,
            upcoming_sundays,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share one test so they never race on the process environment.
    #[test]
    fn test_config_from_env() {
        env::remove_var("SCHEDULER_API_PSK");
        env::remove_var("SCHEDULER_DB_PATH");
        env::remove_var("SCHEDULER_BIND_ADDR");
        env::remove_var("SCHEDULER_LOG_LEVEL");
        env::remove_var("SCHEDULER_LOG_FORMAT");
        env::remove_var("SCHEDULER_UPCOMING_SUNDAYS");

        let config = Config::from_env().unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/scheduler.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.upcoming_sundays, 16);

        env::set_var("SCHEDULER_BIND_ADDR", "not-an-address");
        assert!(Config::from_env().is_err());
        env::remove_var("SCHEDULER_BIND_ADDR");

        env::set_var("SCHEDULER_LOG_FORMAT", "JSON");
        assert_eq!(Config::from_env().unwrap().log_format, LogFormat::Json);
        env::remove_var("SCHEDULER_LOG_FORMAT");
    }
}
