//! State transition history tracking.
//!
//! Every completed transition is recorded: where the machine came from,
//! where it landed, and what was originally requested (filters may redirect,
//! so `requested` and `to` can differ). Recording is immutable — `record`
//! returns a new history.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::key::StateKey;

/// Record of a single completed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<K: StateKey> {
    /// The state being transitioned from
    pub from: K,
    /// The state the machine landed in
    pub to: K,
    /// The key originally requested, before any filter redirect
    pub requested: K,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of completed transitions.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use stance::{StateHistory, TransitionRecord};
///
/// let history: StateHistory<String> = StateHistory::new();
/// let history = history.record(TransitionRecord {
///     from: "idle".to_string(),
///     to: "busy".to_string(),
///     requested: "busy".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.transitions().len(), 1);
/// assert_eq!(history.path(), vec!["idle", "busy"]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<K: StateKey> {
    transitions: Vec<TransitionRecord<K>>,
}

impl<K: StateKey> Default for StateHistory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> StateHistory<K> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history. The original is left
    /// unchanged.
    pub fn record(&self, transition: TransitionRecord<K>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// The path of states traversed: the first record's `from`, then the
    /// `to` of every record in order.
    pub fn path(&self) -> Vec<&K> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Total duration from first to last recorded transition. `None` when
    /// the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// All recorded transitions in order.
    pub fn transitions(&self) -> &[TransitionRecord<K>] {
        &self.transitions
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether anything has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
