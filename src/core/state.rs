//! Per-state hook slots and the filter verdict type.
//!
//! A state is a key plus three optional callbacks. Any slot left empty is a
//! no-op; an empty filter slot means "accept the request unchanged".

use std::fmt;
use std::sync::Arc;

use crate::core::key::StateKey;
use crate::machine::Fsm;

/// Dynamically-typed argument list handed to enter, filter, and from-to
/// hooks alongside a request.
pub type ArgList = Vec<serde_json::Value>;

/// Callback run when the machine transitions into a state.
pub type EnterFn<K> = Arc<dyn Fn(&mut Fsm<K>, &ArgList) + Send + Sync>;

/// Callback run when the machine transitions out of a state.
pub type ExitFn<K> = Arc<dyn Fn(&mut Fsm<K>) + Send + Sync>;

/// Callback consulted on the *current* state before a requested transition
/// executes. May accept, redirect, or reject the request.
pub type FilterFn<K> = Arc<dyn Fn(&mut Fsm<K>, &K, &ArgList) -> FilterResult<K> + Send + Sync>;

/// Callback bound to one exact ordered pair of states, run between the old
/// state's exit and the new state's enter.
pub type FromToFn<K> = Arc<dyn Fn(&mut Fsm<K>, &ArgList) + Send + Sync>;

/// Verdict returned by a state's filter hook.
///
/// `Accept` names the effective target state and the (possibly revised)
/// argument list; returning a target different from the requested key
/// redirects the transition. `Reject` abandons the request with no hooks
/// run. An `Accept` whose target is the machine's `null` sentinel is
/// treated as `Reject`.
///
/// # Example
///
/// ```rust
/// use stance::{ArgList, FilterResult};
///
/// // Accept the request as-is.
/// let requested = "open".to_string();
/// let args = ArgList::new();
/// let verdict = FilterResult::pass(&requested, &args);
/// assert!(matches!(verdict, FilterResult::Accept { .. }));
///
/// // Send the machine somewhere else instead.
/// let verdict: FilterResult<String> = FilterResult::redirect("locked".to_string(), ArgList::new());
/// assert!(matches!(verdict, FilterResult::Accept { .. }));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum FilterResult<K> {
    /// Proceed to `to` with `args`.
    Accept { to: K, args: ArgList },
    /// Abandon the request entirely.
    Reject,
}

impl<K: StateKey> FilterResult<K> {
    /// Accept the requested key with the original arguments unchanged.
    pub fn pass(requested: &K, args: &ArgList) -> Self {
        Self::Accept {
            to: requested.clone(),
            args: args.clone(),
        }
    }

    /// Redirect the transition to a different target.
    pub fn redirect(to: K, args: ArgList) -> Self {
        Self::Accept { to, args }
    }
}

/// The three optional callback slots carried by a registered state.
///
/// Hooks are stored as shared function objects; closures, function pointers,
/// and capturing adapters are all accepted. The machine never owns the
/// callback targets — captures live as long as the hook itself.
///
/// # Example
///
/// ```rust
/// use stance::{FilterResult, StateHooks};
///
/// let hooks: StateHooks<String> = StateHooks::new()
///     .on_enter(|_fsm, _args| println!("entered"))
///     .on_exit(|_fsm| println!("left"))
///     .with_filter(|_fsm, requested, args| FilterResult::pass(requested, args));
/// ```
pub struct StateHooks<K: StateKey> {
    enter: Option<EnterFn<K>>,
    exit: Option<ExitFn<K>>,
    filter: Option<FilterFn<K>>,
}

impl<K: StateKey> StateHooks<K> {
    /// A state with no hooks at all. Perfectly legal: transitions into and
    /// out of it run zero callbacks.
    pub fn new() -> Self {
        Self {
            enter: None,
            exit: None,
            filter: None,
        }
    }

    /// Set the enter callback.
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Fsm<K>, &ArgList) + Send + Sync + 'static,
    {
        self.enter = Some(Arc::new(f));
        self
    }

    /// Set the exit callback.
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Fsm<K>) + Send + Sync + 'static,
    {
        self.exit = Some(Arc::new(f));
        self
    }

    /// Set the filter callback.
    pub fn with_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Fsm<K>, &K, &ArgList) -> FilterResult<K> + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }

    pub(crate) fn enter(&self) -> Option<&EnterFn<K>> {
        self.enter.as_ref()
    }

    pub(crate) fn exit(&self) -> Option<&ExitFn<K>> {
        self.exit.as_ref()
    }

    pub(crate) fn filter(&self) -> Option<&FilterFn<K>> {
        self.filter.as_ref()
    }
}

impl<K: StateKey> Default for StateHooks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> Clone for StateHooks<K> {
    fn clone(&self) -> Self {
        Self {
            enter: self.enter.clone(),
            exit: self.exit.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<K: StateKey> fmt::Debug for StateHooks<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHooks")
            .field("enter", &self.enter.is_some())
            .field("exit", &self.exit.is_some())
            .field("filter", &self.filter.is_some())
            .finish()
    }
}
