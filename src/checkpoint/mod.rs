//! Checkpoint and resume functionality for machines.
//!
//! A checkpoint captures the serializable half of a machine — its name,
//! settled current state, and transition history. Hooks are not
//! serializable and are not included: restoring re-attaches the snapshot to
//! a machine whose states have already been registered, and runs no hooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::history::StateHistory;
use crate::core::key::StateKey;
use crate::machine::{CurrentState, Fsm};

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's settled state.
///
/// # Example
///
/// ```rust
/// use stance::{Fsm, Sentinels, StateHooks};
///
/// let mut fsm = Fsm::new("door", Sentinels::default());
/// fsm.add_state("open".to_string(), StateHooks::new());
/// fsm.request("open".to_string());
///
/// let checkpoint = fsm.checkpoint().unwrap();
/// let bytes = checkpoint.to_bytes().unwrap();
///
/// // Later, in a fresh process, after states are registered again:
/// let mut restored = Fsm::new("door", Sentinels::default());
/// restored.add_state("open".to_string(), StateHooks::new());
/// let checkpoint = stance::Checkpoint::from_bytes(&bytes).unwrap();
/// restored.restore(&checkpoint).unwrap();
/// assert_eq!(restored.current_or_next_state(), "open");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<K: StateKey> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When the checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the machine that was captured
    pub machine: String,

    /// The settled current state
    pub current: K,

    /// Complete transition history
    pub history: StateHistory<K>,
}

impl<K: StateKey> Checkpoint<K> {
    /// Encode to the binary wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Decode from the binary wire form, validating the format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate_version()?;
        Ok(checkpoint)
    }

    /// Encode to JSON.
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Decode from JSON, validating the format version.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate_version()?;
        Ok(checkpoint)
    }

    fn validate_version(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }
}

impl<K: StateKey> Fsm<K> {
    /// Capture a checkpoint of the machine's settled state.
    ///
    /// Fails with [`CheckpointError::InTransition`] when called from inside
    /// a hook while a transition is being processed.
    pub fn checkpoint(&self) -> Result<Checkpoint<K>, CheckpointError> {
        let current = match self.current_state() {
            CurrentState::Settled(key) => key.clone(),
            CurrentState::InTransition { .. } => return Err(CheckpointError::InTransition),
        };

        Ok(Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine: self.name().to_string(),
            current,
            history: self.history().clone(),
        })
    }

    /// Re-attach a checkpoint: the current state and history are replaced,
    /// deferred requests are discarded, and no hooks run. The checkpointed
    /// current key must be `off` or a registered state.
    pub fn restore(&mut self, checkpoint: &Checkpoint<K>) -> Result<(), CheckpointError> {
        checkpoint.validate_version()?;

        if self.is_in_transition() {
            return Err(CheckpointError::InTransition);
        }
        if checkpoint.current != *self.sentinels().off() && !self.has_state(&checkpoint.current) {
            return Err(CheckpointError::UnknownState(format!(
                "{:?}",
                checkpoint.current
            )));
        }

        self.restore_snapshot(checkpoint.current.clone(), checkpoint.history.clone());
        Ok(())
    }
}
