//! Error handling module for the admin console.
//!
//! Provides the central error type, the backend error body, and the operator-facing
//! descriptions of unexpected HTTP statuses.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_STATE: &str = "INVALID_STATE";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Message shown when a request fails without a usable server message.
pub const RETRY_MESSAGE: &str = "Request failed. Check your connection and try again.";

/// Application error type.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Invalid or missing configuration
    Config(String),
    /// No response from the remote service
    Transport(String),
    /// A response body that does not match the expected shape
    Decode(String),
    /// Invalid field name or value
    Validation(String),
    /// Operation not allowed in the current form phase
    InvalidState(String),
    /// Record not present in the fetched collection
    NotFound(String),
    /// Anything else
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Transport(_) => codes::TRANSPORT_ERROR,
            AppError::Decode(_) => codes::DECODE_ERROR,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::InvalidState(_) => codes::INVALID_STATE,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Config(msg)
            | AppError::Transport(msg)
            | AppError::Decode(msg)
            | AppError::Validation(msg)
            | AppError::InvalidState(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(format!("Invalid response body: {}", err))
        } else {
            AppError::Transport(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("Invalid URL: {}", err))
    }
}

/// Error body returned by the backend on 4xx/5xx.
///
/// Only `message` is part of the contract; anything else is kept raw.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ErrorBody {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Decode leniently: bodies that are not a JSON object yield no message.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

/// Describe an unexpected status for the operator.
pub fn describe_failure(status: StatusCode, body: Option<&ErrorBody>) -> String {
    match status {
        StatusCode::NOT_FOUND => "Route not found.".to_string(),
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error.".to_string(),
        _ => body
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| format!("Internal error {}", status.as_u16())),
    }
}
