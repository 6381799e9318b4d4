//! Build errors for machine construction.

use thiserror::Error;

/// Errors that can occur when assembling a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Sentinel keys must be pairwise distinct")]
    SentinelCollision,

    #[error("Sentinels not specified. Call .sentinels(..) before .build()")]
    MissingSentinels,

    #[error("State key {0} is reserved by a sentinel")]
    ReservedStateKey(String),
}
