// src/error.rs

//! Unified error handling for the tracker application.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// No tracking number was supplied
    #[error("tracking number is empty")]
    EmptyInput,

    /// Auto-detection found no carrier for the tracking number
    #[error("no carrier recognizes tracking number '{0}'")]
    UnrecognizedCarrier(String),

    /// An explicit carrier override is not in the registry
    #[error("unsupported carrier '{0}'")]
    UnsupportedCarrier(String),

    /// Injected lookup failure
    #[error("tracking number '{0}' not found")]
    NotFound(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Carrier pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl fmt::Display) -> Self {
        Self::Internal(message.to_string())
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::UnrecognizedCarrier(_)
                | Self::UnsupportedCarrier(_)
                | Self::Validation(_)
        )
    }

    /// Message shown to end users.
    ///
    /// Anything that is not a lookup outcome collapses to the generic
    /// server error so internals never reach the client.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => "快递单号不能为空".to_string(),
            Self::UnrecognizedCarrier(_) => "无法识别快递公司，请手动选择".to_string(),
            Self::UnsupportedCarrier(_) => "不支持的快递公司".to_string(),
            Self::NotFound(_) => "快递单号不存在或已过期".to_string(),
            Self::Validation(message) => message.clone(),
            _ => "服务器内部错误".to_string(),
        }
    }
}
