//! Transition tables: pure data mapping `(state, event)` to the next state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::key::{EventKey, StateKey};

/// One row of a transition table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRule<K: StateKey, E: EventKey> {
    /// State the machine must currently be in
    pub from: K,
    /// Event that triggers the transition
    pub on: E,
    /// State to request when the row matches
    pub to: K,
}

/// Immutable lookup table from `(current state, event)` to the next state.
///
/// The table is pure data with an explicit owner — typically built once at
/// setup time, or loaded from configuration — and consulted by an
/// [`EventDriver`](crate::driver::EventDriver) on every incoming event.
/// It serializes as a list of rules.
///
/// # Example
///
/// ```rust
/// use stance::TransitionTable;
///
/// let json = r#"[
///     {"from": "idle", "on": "start", "to": "running"},
///     {"from": "running", "on": "stop", "to": "idle"}
/// ]"#;
///
/// let table: TransitionTable<String, String> = serde_json::from_str(json).unwrap();
/// assert_eq!(
///     table.next(&"idle".to_string(), &"start".to_string()),
///     Some(&"running".to_string())
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    bound = "",
    from = "Vec<TransitionRule<K, E>>",
    into = "Vec<TransitionRule<K, E>>"
)]
pub struct TransitionTable<K: StateKey, E: EventKey> {
    rules: HashMap<(K, E), K>,
}

impl<K: StateKey, E: EventKey> TransitionTable<K, E> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Build a table from a list of rules. Later rules replace earlier ones
    /// with the same `(from, on)` pair.
    pub fn with_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = TransitionRule<K, E>>,
    {
        let mut table = Self::new();
        for rule in rules {
            table.insert(rule.from, rule.on, rule.to);
        }
        table
    }

    /// Add or replace a row. Returns the previous target, if any.
    pub fn insert(&mut self, from: K, on: E, to: K) -> Option<K> {
        self.rules.insert((from, on), to)
    }

    /// Look up the next state for `(from, on)`.
    pub fn next(&self, from: &K, on: &E) -> Option<&K> {
        self.rules.get(&(from.clone(), on.clone()))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rows as an owned rule list (order unspecified).
    pub fn rules(&self) -> Vec<TransitionRule<K, E>> {
        self.clone().into()
    }
}

impl<K: StateKey, E: EventKey> Default for TransitionTable<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey, E: EventKey> From<Vec<TransitionRule<K, E>>> for TransitionTable<K, E> {
    fn from(rules: Vec<TransitionRule<K, E>>) -> Self {
        Self::with_rules(rules)
    }
}

impl<K: StateKey, E: EventKey> From<TransitionTable<K, E>> for Vec<TransitionRule<K, E>> {
    fn from(table: TransitionTable<K, E>) -> Self {
        table
            .rules
            .into_iter()
            .map(|((from, on), to)| TransitionRule { from, on, to })
            .collect()
    }
}
