//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::key::{Sentinels, StateKey};
use crate::core::state::{ArgList, FromToFn, StateHooks};
use crate::machine::Fsm;
use std::sync::Arc;

/// Builder for constructing a machine with a fluent API.
///
/// Unlike [`Fsm::new`] followed by `add_state` calls, the builder validates
/// up front: sentinels must be supplied and no registered state may shadow
/// a sentinel key.
///
/// # Example
///
/// ```rust
/// use stance::{FsmBuilder, Sentinels, StateHooks};
///
/// let fsm = FsmBuilder::new("door")
///     .sentinels(Sentinels::default())
///     .state("open".to_string(), StateHooks::new())
///     .state("closed".to_string(), StateHooks::new())
///     .from_to("open".to_string(), "closed".to_string(), |_, _| {
///         println!("slamming");
///     })
///     .build()
///     .unwrap();
///
/// assert!(fsm.is_off());
/// ```
pub struct FsmBuilder<K: StateKey> {
    name: String,
    sentinels: Option<Sentinels<K>>,
    states: Vec<(K, StateHooks<K>)>,
    from_to: Vec<(K, K, FromToFn<K>)>,
    max_pending: Option<usize>,
}

impl<K: StateKey> FsmBuilder<K> {
    /// Create a new builder for a machine with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sentinels: None,
            states: Vec::new(),
            from_to: Vec::new(),
            max_pending: None,
        }
    }

    /// Set the reserved sentinel values (required).
    pub fn sentinels(mut self, sentinels: Sentinels<K>) -> Self {
        self.sentinels = Some(sentinels);
        self
    }

    /// Register a state.
    pub fn state(mut self, key: K, hooks: StateHooks<K>) -> Self {
        self.states.push((key, hooks));
        self
    }

    /// Register a from-to hook for the exact ordered pair `(from, to)`.
    pub fn from_to<F>(mut self, from: K, to: K, hook: F) -> Self
    where
        F: Fn(&mut Fsm<K>, &ArgList) + Send + Sync + 'static,
    {
        self.from_to.push((from, to, Arc::new(hook)));
        self
    }

    /// Cap on deferred reentrant requests.
    pub fn max_pending(mut self, max: usize) -> Self {
        self.max_pending = Some(max);
        self
    }

    /// Build the machine.
    /// Returns an error if sentinels are missing or a state key shadows one.
    pub fn build(self) -> Result<Fsm<K>, BuildError> {
        let sentinels = self.sentinels.ok_or(BuildError::MissingSentinels)?;

        for (key, _) in &self.states {
            if sentinels.is_reserved(key) {
                return Err(BuildError::ReservedStateKey(format!("{key:?}")));
            }
        }

        let mut fsm = Fsm::new(self.name, sentinels);
        for (key, hooks) in self.states {
            fsm.add_state(key, hooks);
        }
        for (from, to, hook) in self.from_to {
            fsm.insert_from_to(from, to, hook);
        }
        if let Some(max) = self.max_pending {
            fsm.set_max_pending(max);
        }

        Ok(fsm)
    }
}
