//! Table-driven event dispatch.
//!
//! The driver is the standard owner of a machine: it holds one
//! [`Fsm`](crate::machine::Fsm) and one immutable
//! [`TransitionTable`](crate::driver::TransitionTable), translates each
//! incoming event into a table lookup against the current state, and
//! requests the resulting transition. An event with no matching row is a
//! non-fatal no-op, logged at debug level.

mod table;

pub use table::{TransitionRule, TransitionTable};

use tracing::debug;

use crate::core::key::{EventKey, StateKey};
use crate::machine::{CurrentState, Fsm, RequestOutcome};

/// Drives a machine from a transition table.
///
/// # Example
///
/// ```rust
/// use stance::{EventDriver, Fsm, Sentinels, StateHooks, TransitionRule, TransitionTable};
///
/// let mut fsm = Fsm::new("player", Sentinels::default());
/// fsm.add_state("idle".to_string(), StateHooks::new());
/// fsm.add_state("running".to_string(), StateHooks::new());
/// fsm.request("idle".to_string());
///
/// let table = TransitionTable::with_rules(vec![TransitionRule {
///     from: "idle".to_string(),
///     on: "key-forward".to_string(),
///     to: "running".to_string(),
/// }]);
///
/// let mut driver = EventDriver::new(fsm, table);
/// driver.handle(&"key-forward".to_string());
/// assert_eq!(driver.fsm().current_or_next_state(), "running");
/// ```
pub struct EventDriver<K: StateKey, E: EventKey> {
    fsm: Fsm<K>,
    table: TransitionTable<K, E>,
}

impl<K: StateKey, E: EventKey> EventDriver<K, E> {
    /// Pair a machine with its transition table.
    pub fn new(fsm: Fsm<K>, table: TransitionTable<K, E>) -> Self {
        Self { fsm, table }
    }

    /// Dispatch one event: look up `(current state, event)` and request the
    /// resulting state. Returns `None` when no row matches or the machine
    /// is mid-transition; both are non-fatal.
    pub fn handle(&mut self, event: &E) -> Option<RequestOutcome<K>> {
        let current = match self.fsm.current_state() {
            CurrentState::Settled(key) => key.clone(),
            CurrentState::InTransition { .. } => {
                debug!(machine = %self.fsm.name(), event = ?event, "event arrived mid-transition, ignoring");
                return None;
            }
        };

        match self.table.next(&current, event) {
            Some(next) => Some(self.fsm.request(next.clone())),
            None => {
                debug!(machine = %self.fsm.name(), state = ?current, event = ?event, "transition not defined");
                None
            }
        }
    }

    /// The driven machine.
    pub fn fsm(&self) -> &Fsm<K> {
        &self.fsm
    }

    /// Mutable access to the driven machine, for direct requests and
    /// registry changes.
    pub fn fsm_mut(&mut self) -> &mut Fsm<K> {
        &mut self.fsm
    }

    /// The transition table.
    pub fn table(&self) -> &TransitionTable<K, E> {
        &self.table
    }

    /// Take the machine and table back.
    pub fn into_parts(self) -> (Fsm<K>, TransitionTable<K, E>) {
        (self.fsm, self.table)
    }
}
