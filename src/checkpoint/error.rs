//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The machine is mid-transition; checkpoints capture settled states only
    #[error("Machine is mid-transition, checkpoint unavailable")]
    InTransition,

    /// The checkpointed current state is unknown to the restoring machine
    #[error("Checkpoint state {0} is not registered on this machine")]
    UnknownState(String),
}
