//! Configuration module for the admin console.
//!
//! All configuration is loaded from environment variables (and `.env`) with sensible defaults.

use std::env;
use std::str::FromStr;

use url::Url;

use crate::errors::AppError;

/// How concurrent postal-code lookups for one form are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Every response is merged as it arrives; a slow, stale response can
    /// overwrite the address of a newer postal code.
    #[default]
    LastResponseWins,
    /// Responses for anything but the most recent postal-code edit are dropped.
    LatestRequestOnly,
}

impl FromStr for LookupPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last-response-wins" => Ok(LookupPolicy::LastResponseWins),
            "latest-request-only" => Ok(LookupPolicy::LatestRequestOnly),
            other => Err(AppError::Config(format!(
                "Invalid ISP_ADMIN_LOOKUP_POLICY '{}' (expected last-response-wins or latest-request-only)",
                other
            ))),
        }
    }
}

/// Output format of the log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Invalid ISP_ADMIN_LOG_FORMAT '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the customers/routers REST service
    pub api_url: Url,
    /// Base URL of the postal-code lookup service
    pub postal_url: Url,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub lookup_policy: LookupPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_url = env::var("ISP_ADMIN_API_URL")
            .unwrap_or_else(|_| "http://localhost:3001".to_string());
        let api_url = Url::parse(&api_url)?;

        let postal_url = env::var("ISP_ADMIN_POSTAL_URL")
            .unwrap_or_else(|_| "https://viacep.com.br/ws/".to_string());
        let postal_url = Url::parse(&postal_url)?;

        let log_level = env::var("ISP_ADMIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("ISP_ADMIN_LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => LogFormat::default(),
        };

        let lookup_policy = match env::var("ISP_ADMIN_LOOKUP_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => LookupPolicy::default(),
        };

        Ok(Self {
            api_url,
            postal_url,
            log_level,
            log_format,
            lookup_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases live in one test: the process environment is shared between test threads
    #[test]
    fn test_config_from_env() {
        env::remove_var("ISP_ADMIN_API_URL");
        env::remove_var("ISP_ADMIN_POSTAL_URL");
        env::remove_var("ISP_ADMIN_LOG_LEVEL");
        env::remove_var("ISP_ADMIN_LOOKUP_POLICY");
        env::remove_var("ISP_ADMIN_LOG_FORMAT");

        let config = Config::from_env().unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:3001/");
        assert_eq!(config.postal_url.as_str(), "https://viacep.com.br/ws/");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.lookup_policy, LookupPolicy::LastResponseWins);
        assert_eq!(config.log_format, LogFormat::Text);

        env::set_var("ISP_ADMIN_LOG_FORMAT", "JSON");
        assert_eq!(Config::from_env().unwrap().log_format, LogFormat::Json);
        env::set_var("ISP_ADMIN_LOG_FORMAT", "xml");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));
        env::remove_var("ISP_ADMIN_LOG_FORMAT");

        env::set_var("ISP_ADMIN_LOOKUP_POLICY", "latest-request-only");
        let config = Config::from_env().unwrap();
        assert_eq!(config.lookup_policy, LookupPolicy::LatestRequestOnly);

        env::set_var("ISP_ADMIN_LOOKUP_POLICY", "whenever");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));

        env::set_var("ISP_ADMIN_LOOKUP_POLICY", "last-response-wins");
        env::set_var("ISP_ADMIN_API_URL", "not a url");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));

        env::remove_var("ISP_ADMIN_API_URL");
        env::remove_var("ISP_ADMIN_LOOKUP_POLICY");
    }
}
