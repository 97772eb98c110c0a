//! Unified error types for all layers of the application.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Agora.
///
/// Infrastructure variants (`Database`, `Cache`) are transient and safe for the
/// caller to retry; the engine itself never retries.
#[derive(Error, Debug)]
pub enum AgoraError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgoraError {
    /// Returns the HTTP status code the presentation layer should map this error to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Cache(_) | Self::Timeout(_) => 503,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Cache(_) | Self::Timeout(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AgoraError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut => Self::Timeout(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::redis::RedisError> for AgoraError {
    fn from(err: deadpool_redis::redis::RedisError) -> Self {
        Self::Cache(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::PoolError> for AgoraError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Cache(format!("Failed to get Redis connection: {}", err))
    }
}

impl From<serde_json::Error> for AgoraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(resource_type: &'static str, id: i64) -> AgoraError {
        AgoraError::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(not_found("Post", 1).status_code(), 404);
        assert_eq!(AgoraError::validation("bad kind").status_code(), 400);
        assert_eq!(AgoraError::cache("redis down").status_code(), 503);
        assert_eq!(AgoraError::Database("db error".to_string()).status_code(), 500);
        assert_eq!(AgoraError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(not_found("Comment", 7).error_code(), "NOT_FOUND");
        assert_eq!(AgoraError::cache("x").error_code(), "CACHE_ERROR");
        assert_eq!(AgoraError::Configuration("x".to_string()).error_code(), "CONFIGURATION_ERROR");
        assert_eq!(AgoraError::Timeout("t".to_string()).error_code(), "TIMEOUT");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(AgoraError::cache("connection refused").is_retriable());
        assert!(AgoraError::Database("connection lost".to_string()).is_retriable());
        assert!(AgoraError::Timeout("pool".to_string()).is_retriable());
        assert!(!AgoraError::validation("bad input").is_retriable());
        assert!(!not_found("Post", 1).is_retriable());
    }

    #[test]
    fn test_not_found_display() {
        let err = not_found("Post", 42);
        assert_eq!(err.to_string(), "Resource not found: Post with id 42");
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_from_sqlx_row_not_found() {
        let err = AgoraError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AgoraError::NotFound { .. }));
    }
}
