use std::time::Duration;

use thiserror::Error;

/// Why a cache call produced no answer.
///
/// A miss is `Ok(None)`, never one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Backend unreachable.
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    /// Backend reachable but rejected the command.
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    /// Stored bytes are not a valid entity, or an entity failed to encode.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Call abandoned after the configured bound.
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, CacheError>;
