use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of error kinds reported to tool callers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    NotFound,
    RateLimit,
    Network,
    ApiError,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "VALIDATION",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::Network => "NETWORK",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Trials service error types
///
/// Every failure from input validation, the registry transport or the
/// registry itself is mapped into one of these before it reaches a caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrialsError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl TrialsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TrialsError::Validation(_) => ErrorCode::Validation,
            TrialsError::NotFound(_) => ErrorCode::NotFound,
            TrialsError::RateLimited { .. } => ErrorCode::RateLimit,
            TrialsError::Network(_) => ErrorCode::Network,
            TrialsError::Api { .. } => ErrorCode::ApiError,
            TrialsError::Unknown(_) => ErrorCode::Unknown,
        }
    }

    /// HTTP status reported by the registry, if the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            TrialsError::Api { status, .. } => Some(*status),
            TrialsError::NotFound(_) => Some(404),
            TrialsError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            message: self.to_string(),
            code: self.code(),
        }
    }
}

/// Error message and code pair attached to failed responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    pub message: String,
    pub code: ErrorCode,
}
