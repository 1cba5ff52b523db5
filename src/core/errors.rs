//! Custom error types for translation operations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Caller input rejected before the backend was invoked
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
    },

    /// Backend unreachable, rejected the request or returned an error status
    #[error("Backend unavailable: {}", describe_status(*status, message))]
    BackendUnavailable {
        status: Option<u16>,
        message: String,
    },

    /// Backend answered but the sanitized reply is not valid JSON
    #[error("Malformed reply: {message}")]
    MalformedReply {
        message: String,
    },

    /// Backend call exceeded the configured wait
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        timeout_ms: u64,
    },

    /// Caller gave up before the pipeline finished
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn describe_status(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{} - {}", code, message),
        None => message.to_string(),
    }
}

impl TranslationError {
    /// Caller-facing kind, `None` for errors that never occur on the request path
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            TranslationError::InvalidRequest { .. } => Some(ErrorKind::InvalidRequest),
            TranslationError::BackendUnavailable { .. } => Some(ErrorKind::BackendUnavailable),
            TranslationError::MalformedReply { .. } => Some(ErrorKind::MalformedReply),
            TranslationError::Timeout { .. } => Some(ErrorKind::Timeout),
            TranslationError::Cancelled => Some(ErrorKind::Cancelled),
            TranslationError::ConfigError { .. } | TranslationError::IoError(_) => None,
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::BackendUnavailable {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    BackendUnavailable,
    MalformedReply,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    /// Generic text safe to hand to an external caller
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "Invalid translation request",
            ErrorKind::BackendUnavailable => "Error translating JSON",
            ErrorKind::MalformedReply => "Translation service returned invalid JSON",
            ErrorKind::Timeout => "Translation timed out",
            ErrorKind::Cancelled => "Translation cancelled",
        }
    }

    /// HTTP status used by the API server
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidRequest => 400,
            ErrorKind::BackendUnavailable | ErrorKind::MalformedReply => 502,
            ErrorKind::Timeout => 504,
            // nginx's "client closed request"
            ErrorKind::Cancelled => 499,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidRequest => write!(f, "invalid_request"),
            ErrorKind::BackendUnavailable => write!(f, "backend_unavailable"),
            ErrorKind::MalformedReply => write!(f, "malformed_reply"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
