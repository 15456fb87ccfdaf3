//! Error types for puremath.
//!
//! This module defines all error types used throughout the puremath crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for puremath operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Problem Errors ===
    /// The question text could not be parsed as a math expression.
    #[error("parse error at position {position}: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
        /// Character offset into the normalized question.
        position: usize,
    },

    /// The question was understood but falls outside the supported scope.
    #[error("unsupported problem: {message}")]
    UnsupportedProblem {
        /// What is missing, phrased for the user.
        message: String,
    },

    /// A mathematically invalid operation was requested.
    #[error("math error: {message}")]
    MathDomain {
        /// Description of the invalid operation.
        message: String,
    },

    /// The client has exceeded the request rate limit.
    #[error("rate limit exceeded, try again in {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the next request would be accepted.
        retry_after_secs: u64,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An operation timed out.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for puremath operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new parse error at a character position.
    #[must_use]
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }

    /// Create a new unsupported-problem error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedProblem {
            message: message.into(),
        }
    }

    /// Create a new math domain error.
    #[must_use]
    pub fn math_domain(message: impl Into<String>) -> Self {
        Self::MathDomain {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the client should retry later.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Check if this error came from the user's question rather than
    /// the system (parse, scope, or math domain failures).
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::UnsupportedProblem { .. } | Self::MathDomain { .. }
        )
    }
}
