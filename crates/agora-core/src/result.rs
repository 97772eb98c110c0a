//! Result type aliases for Agora.

use crate::AgoraError;

/// A specialized `Result` type for Agora operations.
pub type AgoraResult<T> = Result<T, AgoraError>;
