//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this build
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint decoded but its contents are inconsistent
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),
}
