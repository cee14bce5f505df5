//! Error types for vidfeed.

use thiserror::Error;

/// Common error type for vidfeed.
#[derive(Error, Debug)]
pub enum VidfeedError {
    /// Upstream resource (channel, group, user) does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Link could not be classified, or its source type is not handled.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Any other upstream failure.
    ///
    /// Carries the upstream HTTP status when a response was received.
    #[error("{}", transient_message(.status, .message))]
    Transient {
        status: Option<u16>,
        message: String,
    },

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Episode list could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

fn transient_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("upstream error (status {}): {}", code, message),
        None => format!("upstream error: {}", message),
    }
}

impl VidfeedError {
    /// Build a transient error without an upstream status.
    pub fn transient(message: impl Into<String>) -> Self {
        VidfeedError::Transient {
            status: None,
            message: message.into(),
        }
    }

    /// Prefix the error message with call context.
    ///
    /// The error kind (and any upstream status) is preserved.
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        match self {
            VidfeedError::NotFound(what) => VidfeedError::NotFound(format!("{}: {}", context, what)),
            VidfeedError::Unsupported(msg) => {
                VidfeedError::Unsupported(format!("{}: {}", context, msg))
            }
            VidfeedError::Transient { status, message } => VidfeedError::Transient {
                status,
                message: format!("{}: {}", context, message),
            },
            other => other,
        }
    }

    /// Returns true if the upstream resource was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VidfeedError::NotFound(_))
    }

    /// Returns true for transient upstream failures.
    pub fn is_transient(&self) -> bool {
        matches!(self, VidfeedError::Transient { .. })
    }

    /// Upstream HTTP status, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            VidfeedError::Transient { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<sqlx::Error> for VidfeedError {
    fn from(e: sqlx::Error) -> Self {
        VidfeedError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for VidfeedError {
    fn from(e: serde_json::Error) -> Self {
        VidfeedError::Serialization(e.to_string())
    }
}

/// Result type alias for vidfeed operations.
pub type Result<T> = std::result::Result<T, VidfeedError>;
