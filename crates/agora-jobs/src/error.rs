//! Job error types.

use agora_core::AgoraError;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Job-related errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// A flush pass failed as a whole.
    #[error("Flush failed: {0}")]
    Flush(#[from] AgoraError),

    /// Scheduler lifecycle error.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JobError {
    /// Returns true if running the job again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            JobError::Flush(err) => err.is_retriable(),
            JobError::Scheduler(_) | JobError::Configuration(_) => false,
        }
    }
}

impl From<JobError> for AgoraError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Flush(inner) => inner,
            JobError::Configuration(message) => AgoraError::Configuration(message),
            JobError::Scheduler(message) => AgoraError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_failure_is_retryable() {
        let err = JobError::from(AgoraError::cache("connection refused"));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_lifecycle_errors_are_not_retryable() {
        assert!(!JobError::Scheduler("already running".into()).is_retryable());
        assert!(!JobError::Configuration("bad cron".into()).is_retryable());
    }

    #[test]
    fn test_into_agora_error_unwraps_flush() {
        let err = AgoraError::from(JobError::Flush(AgoraError::cache("down")));
        assert!(matches!(err, AgoraError::Cache(_)));

        let err = AgoraError::from(JobError::Configuration("bad cron".into()));
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_internal_flush_error_is_not_retryable() {
        let err = JobError::from(AgoraError::internal("bug"));
        assert!(!err.is_retryable());
    }
}
