//! The machine: state registry, from-to table, and the transition protocol.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::core::history::{StateHistory, TransitionRecord};
use crate::core::key::{Sentinels, StateKey};
use crate::core::state::{ArgList, FilterResult, FromToFn, StateHooks};
use crate::machine::outcome::{CurrentState, RequestOutcome};

const DEFAULT_MAX_PENDING: usize = 64;

/// Where the machine is: settled in one state, or processing a transition.
enum Lifecycle<K> {
    Idle(K),
    Transitioning { from: K, to: K },
}

/// A finite state machine over keys of type `K`.
///
/// States are registered at runtime, each carrying optional enter, exit,
/// and filter hooks; directed state pairs may additionally carry from-to
/// hooks. Every change of state flows through [`request`](Fsm::request) or
/// [`demand`](Fsm::demand):
///
/// 1. The current state's filter accepts, redirects, or rejects the
///    requested key.
/// 2. The old state's exit hook runs.
/// 3. The exact `(from, to)` from-to hook runs, if registered.
/// 4. The new state's enter hook runs with the (possibly revised) args.
///
/// While steps 2–4 execute the machine reports the `in_transition`
/// sentinel; a `request` made from inside a hook is deferred until the
/// machine settles, while `demand` executes a nested transition
/// immediately and the outer call yields to its result.
///
/// Requesting an unregistered key, or a key the filter rejects, changes
/// nothing and raises no error — the machine logs a debug diagnostic and
/// carries on.
///
/// # Example
///
/// ```rust
/// use stance::{Fsm, Sentinels, StateHooks};
///
/// let mut fsm = Fsm::new("door", Sentinels::default());
/// fsm.add_state("open".to_string(), StateHooks::new());
/// fsm.add_state("closed".to_string(), StateHooks::new());
///
/// let outcome = fsm.request("closed".to_string());
/// assert!(outcome.is_transitioned());
/// assert_eq!(fsm.current_or_next_state(), "closed");
///
/// fsm.cleanup();
/// assert!(fsm.is_off());
/// ```
pub struct Fsm<K: StateKey> {
    name: String,
    sentinels: Sentinels<K>,
    states: HashMap<K, StateHooks<K>>,
    from_to: HashMap<(K, K), FromToFn<K>>,
    lifecycle: Lifecycle<K>,
    pending: VecDeque<(K, ArgList)>,
    max_pending: usize,
    seq: u64,
    history: StateHistory<K>,
}

impl<K: StateKey> Fsm<K> {
    /// Create a machine in the `off` state.
    pub fn new(name: impl Into<String>, sentinels: Sentinels<K>) -> Self {
        let lifecycle = Lifecycle::Idle(sentinels.off().clone());
        Self {
            name: name.into(),
            sentinels,
            states: HashMap::new(),
            from_to: HashMap::new(),
            lifecycle,
            pending: VecDeque::new(),
            max_pending: DEFAULT_MAX_PENDING,
            seq: 0,
            history: StateHistory::new(),
        }
    }

    /// The machine's name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The reserved sentinel values this machine was built with.
    pub fn sentinels(&self) -> &Sentinels<K> {
        &self.sentinels
    }

    /// Register or replace the state identified by `key`. Registering under
    /// a reserved sentinel key is refused. Only mutates the registry; the
    /// current state is unaffected.
    ///
    /// Registration is a settled-machine operation: calling this from
    /// inside a hook, while a transition is being processed, is
    /// unsupported.
    pub fn add_state(&mut self, key: K, hooks: StateHooks<K>) {
        if self.sentinels.is_reserved(&key) {
            warn!(machine = %self.name, key = ?key, "refusing to register a state under a reserved sentinel key");
            return;
        }
        self.states.insert(key, hooks);
    }

    /// Remove a registered state. Does not trigger exit; if `key` is the
    /// current state, the machine stays in it and later transitions simply
    /// skip the missing hooks.
    pub fn remove_state(&mut self, key: &K) -> bool {
        self.states.remove(key).is_some()
    }

    /// Whether `key` is registered.
    pub fn has_state(&self, key: &K) -> bool {
        self.states.contains_key(key)
    }

    /// Replace the entire state registry. The current state is unaffected.
    pub fn set_state_set<I>(&mut self, states: I)
    where
        I: IntoIterator<Item = (K, StateHooks<K>)>,
    {
        self.states.clear();
        for (key, hooks) in states {
            self.add_state(key, hooks);
        }
    }

    /// Register or replace the hook for the exact ordered pair
    /// `(from, to)`.
    pub fn add_from_to<F>(&mut self, from: K, to: K, hook: F)
    where
        F: Fn(&mut Fsm<K>, &ArgList) + Send + Sync + 'static,
    {
        self.from_to.insert((from, to), Arc::new(hook));
    }

    pub(crate) fn insert_from_to(&mut self, from: K, to: K, hook: FromToFn<K>) {
        self.from_to.insert((from, to), hook);
    }

    /// Remove a from-to hook. A transition along the pair afterwards
    /// silently skips it.
    pub fn remove_from_to(&mut self, from: &K, to: &K) -> bool {
        self.from_to.remove(&(from.clone(), to.clone())).is_some()
    }

    /// Cap on deferred reentrant requests; beyond it they are dropped with
    /// a warning.
    pub fn set_max_pending(&mut self, max: usize) {
        self.max_pending = max;
    }

    /// Request a transition with no arguments.
    pub fn request(&mut self, key: K) -> RequestOutcome<K> {
        self.transition(key, ArgList::new(), false)
    }

    /// Request a transition, passing `args` through to the filter, from-to,
    /// and enter hooks.
    pub fn request_with_args(&mut self, key: K, args: ArgList) -> RequestOutcome<K> {
        self.transition(key, args, false)
    }

    /// Like [`request`](Fsm::request), but bypasses the reentrancy guard:
    /// callable from inside an enter/exit/filter hook to force an
    /// immediate nested transition. The in-flight transition's target is
    /// taken as the state being left, and the outer call yields to the
    /// nested result.
    pub fn demand(&mut self, key: K) -> RequestOutcome<K> {
        self.transition(key, ArgList::new(), true)
    }

    /// [`demand`](Fsm::demand) with arguments.
    pub fn demand_with_args(&mut self, key: K, args: ArgList) -> RequestOutcome<K> {
        self.transition(key, args, true)
    }

    /// The current state key, or the `in_transition` sentinel while a
    /// transition is being processed.
    pub fn current_or_next_state(&self) -> &K {
        match &self.lifecycle {
            Lifecycle::Idle(key) => key,
            Lifecycle::Transitioning { .. } => self.sentinels.in_transition(),
        }
    }

    /// Dual-mode view: the settled state, or the old and new keys of the
    /// transition in progress.
    pub fn current_state(&self) -> CurrentState<'_, K> {
        match &self.lifecycle {
            Lifecycle::Idle(key) => CurrentState::Settled(key),
            Lifecycle::Transitioning { from, to } => CurrentState::InTransition { from, to },
        }
    }

    /// Whether a transition is being processed right now.
    pub fn is_in_transition(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Transitioning { .. })
    }

    /// Whether the machine is in the `off` state.
    pub fn is_off(&self) -> bool {
        matches!(&self.lifecycle, Lifecycle::Idle(key) if key == self.sentinels.off())
    }

    /// Forcibly return the machine to `off`, running the current state's
    /// exit hook (no from-to, no enter) and discarding any deferred
    /// requests. Registered states survive for reuse. Idempotent.
    pub fn cleanup(&mut self) {
        let current = match &self.lifecycle {
            Lifecycle::Idle(key) if key == self.sentinels.off() => return,
            Lifecycle::Idle(key) => key.clone(),
            Lifecycle::Transitioning { to, .. } => to.clone(),
        };

        self.seq = self.seq.wrapping_add(1);
        let off = self.sentinels.off().clone();
        self.lifecycle = Lifecycle::Transitioning {
            from: current.clone(),
            to: off.clone(),
        };

        if let Some(exit) = self.states.get(&current).and_then(|hooks| hooks.exit()).cloned() {
            exit(self);
        }

        self.pending.clear();
        self.history = self.history.record(TransitionRecord {
            from: current,
            to: off.clone(),
            requested: off.clone(),
            timestamp: Utc::now(),
        });
        self.lifecycle = Lifecycle::Idle(off);
    }

    /// Record of every completed transition.
    pub fn history(&self) -> &StateHistory<K> {
        &self.history
    }

    /// Take the accumulated history, leaving an empty one behind.
    pub fn take_history(&mut self) -> StateHistory<K> {
        std::mem::take(&mut self.history)
    }

    pub(crate) fn restore_snapshot(&mut self, current: K, history: StateHistory<K>) {
        self.pending.clear();
        self.seq = self.seq.wrapping_add(1);
        self.lifecycle = Lifecycle::Idle(current);
        self.history = history;
    }

    /// The state a new transition would leave from: the settled state, or
    /// the target of the transition in flight (for nested `demand`).
    fn effective_current(&self) -> K {
        match &self.lifecycle {
            Lifecycle::Idle(key) => key.clone(),
            Lifecycle::Transitioning { to, .. } => to.clone(),
        }
    }

    fn transition(&mut self, requested: K, args: ArgList, forced: bool) -> RequestOutcome<K> {
        if !forced && self.is_in_transition() {
            if self.pending.len() >= self.max_pending {
                warn!(machine = %self.name, key = ?requested, "pending queue full, dropping reentrant request");
                return RequestOutcome::Dropped(requested);
            }
            debug!(machine = %self.name, key = ?requested, "reentrant request deferred until the machine settles");
            self.pending.push_back((requested.clone(), args));
            return RequestOutcome::Deferred(requested);
        }

        if !self.states.contains_key(&requested) {
            debug!(machine = %self.name, key = ?requested, "requested state is not registered, ignoring");
            return RequestOutcome::Unknown(requested);
        }

        let current = self.effective_current();
        let filter = self.states.get(&current).and_then(|hooks| hooks.filter()).cloned();

        let (target, args) = match filter {
            Some(f) => match f(self, &requested, &args) {
                FilterResult::Reject => {
                    debug!(machine = %self.name, key = ?requested, "filter rejected request");
                    return RequestOutcome::Rejected(requested);
                }
                FilterResult::Accept { to, args: revised } => {
                    if to == *self.sentinels.null() {
                        debug!(machine = %self.name, key = ?requested, "filter returned the null sentinel, abandoning request");
                        return RequestOutcome::Rejected(requested);
                    }
                    (to, revised)
                }
            },
            None => (requested.clone(), args),
        };

        if !self.states.contains_key(&target) {
            debug!(machine = %self.name, key = ?target, "filter redirected to an unregistered state, ignoring");
            return RequestOutcome::Unknown(target);
        }

        // The filter may itself have moved the machine; leave from the
        // state it actually sits in now.
        let from = self.effective_current();

        self.seq = self.seq.wrapping_add(1);
        let seq = self.seq;
        self.lifecycle = Lifecycle::Transitioning {
            from: from.clone(),
            to: target.clone(),
        };

        if let Some(exit) = self.states.get(&from).and_then(|hooks| hooks.exit()).cloned() {
            exit(self);
        }
        if self.seq == seq {
            if let Some(hook) = self.from_to.get(&(from.clone(), target.clone())).cloned() {
                hook(self, &args);
            }
        }
        if self.seq == seq {
            if let Some(enter) = self.states.get(&target).and_then(|hooks| hooks.enter()).cloned() {
                enter(self, &args);
            }
        }

        let outcome = if self.seq == seq {
            self.history = self.history.record(TransitionRecord {
                from: from.clone(),
                to: target.clone(),
                requested,
                timestamp: Utc::now(),
            });
            self.lifecycle = Lifecycle::Idle(target.clone());
            debug!(machine = %self.name, from = ?from, to = ?target, "transition complete");
            RequestOutcome::Transitioned { from, to: target }
        } else {
            RequestOutcome::Superseded
        };

        self.drain_pending();
        outcome
    }

    fn drain_pending(&mut self) {
        while matches!(self.lifecycle, Lifecycle::Idle(_)) {
            let Some((key, args)) = self.pending.pop_front() else {
                break;
            };
            let _ = self.transition(key, args, false);
        }
    }
}

impl<K: StateKey> fmt::Debug for Fsm<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("name", &self.name)
            .field("current_or_next", &self.current_or_next_state())
            .field("states", &self.states.len())
            .field("from_to", &self.from_to.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Trace(Arc<Mutex<Vec<String>>>);

    impl Trace {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn traced_hooks(trace: &Trace, name: &str) -> StateHooks<String> {
        let enter_trace = trace.clone();
        let exit_trace = trace.clone();
        let enter_name = name.to_string();
        let exit_name = name.to_string();
        StateHooks::new()
            .on_enter(move |_, _| enter_trace.push(format!("enter({enter_name})")))
            .on_exit(move |_| exit_trace.push(format!("exit({exit_name})")))
    }

    fn traced_fsm(trace: &Trace) -> Fsm<String> {
        let mut fsm = Fsm::new("traced", Sentinels::default());
        for name in ["s01", "s02", "s03", "s04"] {
            fsm.add_state(name.to_string(), traced_hooks(trace, name));
        }
        fsm
    }

    #[test]
    fn machine_starts_off() {
        let fsm: Fsm<String> = Fsm::new("fresh", Sentinels::default());
        assert!(fsm.is_off());
        assert!(!fsm.is_in_transition());
        assert_eq!(fsm.current_or_next_state(), "__off");
    }

    #[test]
    fn request_runs_enter_on_target() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        let outcome = fsm.request("s01".to_string());

        assert!(outcome.is_transitioned());
        assert_eq!(fsm.current_or_next_state(), "s01");
        assert_eq!(trace.entries(), vec!["enter(s01)"]);
    }

    #[test]
    fn transition_runs_exit_then_enter() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        fsm.request("s01".to_string());
        fsm.request("s02".to_string());

        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)", "enter(s02)"]);
    }

    #[test]
    fn self_transition_fires_both_hooks() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        fsm.request("s01".to_string());
        let outcome = fsm.request("s01".to_string());

        assert!(outcome.is_transitioned());
        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)", "enter(s01)"]);
    }

    #[test]
    fn unknown_state_is_ignored() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        fsm.request("s01".to_string());

        let outcome = fsm.request("nonexistent".to_string());

        assert_eq!(outcome, RequestOutcome::Unknown("nonexistent".to_string()));
        assert_eq!(fsm.current_or_next_state(), "s01");
        assert_eq!(trace.entries(), vec!["enter(s01)"]);
    }

    #[test]
    fn from_to_hook_runs_between_exit_and_enter() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        let hook_trace = trace.clone();
        fsm.add_from_to("s01".to_string(), "s02".to_string(), move |_, _| {
            hook_trace.push("from_to(s01,s02)")
        });

        fsm.request("s01".to_string());
        fsm.request("s02".to_string());

        assert_eq!(
            trace.entries(),
            vec!["enter(s01)", "exit(s01)", "from_to(s01,s02)", "enter(s02)"]
        );
    }

    #[test]
    fn from_to_requires_exact_pair() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        let hook_trace = trace.clone();
        fsm.add_from_to("s01".to_string(), "s03".to_string(), move |_, _| {
            hook_trace.push("from_to(s01,s03)")
        });

        fsm.request("s01".to_string());
        fsm.request("s02".to_string());

        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)", "enter(s02)"]);
    }

    #[test]
    fn removed_from_to_hook_is_skipped() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        let hook_trace = trace.clone();
        fsm.add_from_to("s01".to_string(), "s02".to_string(), move |_, _| {
            hook_trace.push("from_to(s01,s02)")
        });

        assert!(fsm.remove_from_to(&"s01".to_string(), &"s02".to_string()));
        assert!(!fsm.remove_from_to(&"s01".to_string(), &"s02".to_string()));

        fsm.request("s01".to_string());
        fsm.request("s02".to_string());

        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)", "enter(s02)"]);
    }

    #[test]
    fn filter_redirects_request() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("redirecting", Sentinels::default());
        fsm.add_state(
            "a".to_string(),
            traced_hooks(&trace, "a").with_filter(|_, _, args| {
                FilterResult::redirect("b".to_string(), args.clone())
            }),
        );
        fsm.add_state("b".to_string(), traced_hooks(&trace, "b"));

        fsm.request("a".to_string());
        let outcome = fsm.request("a".to_string());

        assert_eq!(
            outcome,
            RequestOutcome::Transitioned {
                from: "a".to_string(),
                to: "b".to_string(),
            }
        );
        assert_eq!(fsm.current_or_next_state(), "b");
        assert_eq!(trace.entries(), vec!["enter(a)", "exit(a)", "enter(b)"]);
    }

    #[test]
    fn filter_can_reject() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("rejecting", Sentinels::default());
        fsm.add_state(
            "a".to_string(),
            traced_hooks(&trace, "a").with_filter(|_, _, _| FilterResult::Reject),
        );
        fsm.add_state("b".to_string(), traced_hooks(&trace, "b"));

        fsm.request("a".to_string());
        let outcome = fsm.request("b".to_string());

        assert_eq!(outcome, RequestOutcome::Rejected("b".to_string()));
        assert_eq!(fsm.current_or_next_state(), "a");
        assert_eq!(trace.entries(), vec!["enter(a)"]);
    }

    #[test]
    fn filter_null_sentinel_rejects() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("nulling", Sentinels::default());
        fsm.add_state(
            "a".to_string(),
            traced_hooks(&trace, "a")
                .with_filter(|_, _, args| FilterResult::redirect("__null".to_string(), args.clone())),
        );
        fsm.add_state("b".to_string(), traced_hooks(&trace, "b"));

        fsm.request("a".to_string());
        let outcome = fsm.request("b".to_string());

        assert_eq!(outcome, RequestOutcome::Rejected("b".to_string()));
        assert_eq!(fsm.current_or_next_state(), "a");
    }

    #[test]
    fn filter_redirect_to_unregistered_is_ignored() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("ghosting", Sentinels::default());
        fsm.add_state(
            "a".to_string(),
            traced_hooks(&trace, "a")
                .with_filter(|_, _, args| FilterResult::redirect("ghost".to_string(), args.clone())),
        );
        fsm.add_state("b".to_string(), traced_hooks(&trace, "b"));

        fsm.request("a".to_string());
        let outcome = fsm.request("b".to_string());

        assert_eq!(outcome, RequestOutcome::Unknown("ghost".to_string()));
        assert_eq!(fsm.current_or_next_state(), "a");
    }

    #[test]
    fn filter_sees_requested_key_and_rewrites_args() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("rewriting", Sentinels::default());
        let filter_trace = trace.clone();
        fsm.add_state(
            "a".to_string(),
            StateHooks::new().with_filter(move |_, requested: &String, _| {
                filter_trace.push(format!("filter({requested})"));
                FilterResult::redirect(requested.clone(), vec![json!("rewritten")])
            }),
        );
        let enter_trace = trace.clone();
        fsm.add_state(
            "b".to_string(),
            StateHooks::new().on_enter(move |_, args| {
                enter_trace.push(format!("enter(b, {})", args[0]));
            }),
        );

        fsm.request("a".to_string());
        fsm.request_with_args("b".to_string(), vec![json!("original")]);

        assert_eq!(
            trace.entries(),
            vec!["filter(b)", "enter(b, \"rewritten\")"]
        );
    }

    #[test]
    fn args_reach_from_to_and_enter_hooks() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("args", Sentinels::default());
        fsm.add_state("a".to_string(), StateHooks::new());
        let enter_trace = trace.clone();
        fsm.add_state(
            "b".to_string(),
            StateHooks::new().on_enter(move |_, args| {
                enter_trace.push(format!("enter(b, {})", args[0]));
            }),
        );
        let hook_trace = trace.clone();
        fsm.add_from_to("a".to_string(), "b".to_string(), move |_, args| {
            hook_trace.push(format!("from_to({})", args[0]));
        });

        fsm.request("a".to_string());
        fsm.request_with_args("b".to_string(), vec![json!(7)]);

        assert_eq!(trace.entries(), vec!["from_to(7)", "enter(b, 7)"]);
    }

    #[test]
    fn reentrant_request_is_deferred() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("deferring", Sentinels::default());
        fsm.add_state("a".to_string(), traced_hooks(&trace, "a"));
        let enter_trace = trace.clone();
        fsm.add_state(
            "b".to_string(),
            traced_hooks(&trace, "b").on_enter(move |fsm, _| {
                enter_trace.push("enter(b)");
                match fsm.request("c".to_string()) {
                    RequestOutcome::Deferred(_) => enter_trace.push("deferred(c)"),
                    other => enter_trace.push(format!("unexpected {other:?}")),
                }
            }),
        );
        fsm.add_state("c".to_string(), traced_hooks(&trace, "c"));

        fsm.request("a".to_string());
        let outcome = fsm.request("b".to_string());

        // The outer transition completes first, then the deferred request
        // replays in order.
        assert!(outcome.is_transitioned());
        assert_eq!(fsm.current_or_next_state(), "c");
        assert_eq!(
            trace.entries(),
            vec![
                "enter(a)",
                "exit(a)",
                "enter(b)",
                "deferred(c)",
                "exit(b)",
                "enter(c)"
            ]
        );
    }

    #[test]
    fn pending_queue_overflow_drops() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("overflowing", Sentinels::default());
        fsm.set_max_pending(1);
        fsm.add_state("a".to_string(), StateHooks::new());
        let enter_trace = trace.clone();
        fsm.add_state(
            "b".to_string(),
            StateHooks::new().on_enter(move |fsm, _| {
                match fsm.request("c".to_string()) {
                    RequestOutcome::Deferred(_) => enter_trace.push("deferred(c)"),
                    other => enter_trace.push(format!("unexpected {other:?}")),
                }
                match fsm.request("d".to_string()) {
                    RequestOutcome::Dropped(_) => enter_trace.push("dropped(d)"),
                    other => enter_trace.push(format!("unexpected {other:?}")),
                }
            }),
        );
        fsm.add_state("c".to_string(), StateHooks::new());
        fsm.add_state("d".to_string(), StateHooks::new());

        fsm.request("a".to_string());
        fsm.request("b".to_string());

        assert_eq!(trace.entries(), vec!["deferred(c)", "dropped(d)"]);
        assert_eq!(fsm.current_or_next_state(), "c");
    }

    #[test]
    fn nested_demand_supersedes_outer_transition() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("demanding", Sentinels::default());
        fsm.add_state("a".to_string(), traced_hooks(&trace, "a"));
        let enter_trace = trace.clone();
        fsm.add_state(
            "b".to_string(),
            traced_hooks(&trace, "b").on_enter(move |fsm, _| {
                enter_trace.push("enter(b)");
                fsm.demand("c".to_string());
            }),
        );
        fsm.add_state("c".to_string(), traced_hooks(&trace, "c"));

        fsm.request("a".to_string());
        let outcome = fsm.request("b".to_string());

        assert_eq!(outcome, RequestOutcome::Superseded);
        assert_eq!(fsm.current_or_next_state(), "c");
        assert_eq!(
            trace.entries(),
            vec!["enter(a)", "exit(a)", "enter(b)", "exit(b)", "enter(c)"]
        );
    }

    #[test]
    fn demand_from_idle_behaves_like_request() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        let outcome = fsm.demand("s01".to_string());

        assert!(outcome.is_transitioned());
        assert_eq!(fsm.current_or_next_state(), "s01");
    }

    #[test]
    fn hooks_observe_in_transition_state() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("observing", Sentinels::default());
        let enter_trace = trace.clone();
        fsm.add_state(
            "a".to_string(),
            StateHooks::new().on_enter(move |fsm, _| {
                enter_trace.push(format!("current_or_next={}", fsm.current_or_next_state()));
                match fsm.current_state() {
                    CurrentState::InTransition { from, to } => {
                        enter_trace.push(format!("transition({from},{to})"))
                    }
                    CurrentState::Settled(key) => enter_trace.push(format!("settled({key})")),
                }
            }),
        );

        fsm.request("a".to_string());

        assert_eq!(
            trace.entries(),
            vec![
                "current_or_next=__in_transition",
                "transition(__off,a)"
            ]
        );
        assert_eq!(fsm.current_state(), CurrentState::Settled(&"a".to_string()));
    }

    #[test]
    fn remove_state_leaves_current_dangling() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        fsm.request("s01".to_string());
        assert!(fsm.remove_state(&"s01".to_string()));
        assert_eq!(fsm.current_or_next_state(), "s01");

        fsm.request("s02".to_string());

        // s01's exit hook is gone with the registration.
        assert_eq!(trace.entries(), vec!["enter(s01)", "enter(s02)"]);
        assert_eq!(fsm.current_or_next_state(), "s02");
    }

    #[test]
    fn removed_state_behaves_like_never_registered() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        fsm.request("s01".to_string());

        fsm.remove_state(&"s02".to_string());
        let outcome = fsm.request("s02".to_string());

        assert_eq!(outcome, RequestOutcome::Unknown("s02".to_string()));
        assert_eq!(fsm.current_or_next_state(), "s01");
        assert_eq!(trace.entries(), vec!["enter(s01)"]);
    }

    #[test]
    fn cleanup_runs_exit_and_is_idempotent() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        fsm.request("s01".to_string());

        fsm.cleanup();
        assert!(fsm.is_off());
        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)"]);

        fsm.cleanup();
        assert!(fsm.is_off());
        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)"]);
    }

    #[test]
    fn cleanup_on_fresh_machine_is_noop() {
        let mut fsm: Fsm<String> = Fsm::new("fresh", Sentinels::default());
        fsm.cleanup();
        assert!(fsm.is_off());
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn cleanup_skips_from_to_hooks() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        let hook_trace = trace.clone();
        fsm.add_from_to("s01".to_string(), "__off".to_string(), move |_, _| {
            hook_trace.push("from_to(s01,off)")
        });

        fsm.request("s01".to_string());
        fsm.cleanup();

        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)"]);
    }

    #[test]
    fn machine_is_reusable_after_cleanup() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        fsm.request("s01".to_string());
        fsm.cleanup();
        fsm.request("s02".to_string());

        assert_eq!(fsm.current_or_next_state(), "s02");
        assert_eq!(trace.entries(), vec!["enter(s01)", "exit(s01)", "enter(s02)"]);
    }

    #[test]
    fn set_state_set_replaces_registry_but_not_current() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        fsm.request("s01".to_string());

        fsm.set_state_set(vec![
            ("x".to_string(), traced_hooks(&trace, "x")),
            ("y".to_string(), traced_hooks(&trace, "y")),
        ]);

        assert_eq!(fsm.current_or_next_state(), "s01");
        assert!(!fsm.has_state(&"s02".to_string()));
        assert!(fsm.has_state(&"x".to_string()));

        fsm.request("x".to_string());
        assert_eq!(trace.entries(), vec!["enter(s01)", "enter(x)"]);
    }

    #[test]
    fn reserved_keys_cannot_be_registered() {
        let mut fsm: Fsm<String> = Fsm::new("reserved", Sentinels::default());
        fsm.add_state("__off".to_string(), StateHooks::new());
        fsm.add_state("__in_transition".to_string(), StateHooks::new());

        assert!(!fsm.has_state(&"__off".to_string()));
        assert!(!fsm.has_state(&"__in_transition".to_string()));
        assert_eq!(
            fsm.request("__off".to_string()),
            RequestOutcome::Unknown("__off".to_string())
        );
    }

    #[test]
    fn replacing_a_state_overwrites_hooks() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("replacing", Sentinels::default());
        fsm.add_state("a".to_string(), traced_hooks(&trace, "old"));
        fsm.add_state("a".to_string(), traced_hooks(&trace, "new"));

        fsm.request("a".to_string());

        assert_eq!(trace.entries(), vec!["enter(new)"]);
    }

    #[test]
    fn history_records_completed_transitions() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);

        fsm.request("s01".to_string());
        fsm.request("s02".to_string());
        fsm.request("ghost".to_string());
        fsm.cleanup();

        let records = fsm.history().transitions();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].from, "__off");
        assert_eq!(records[0].to, "s01");
        assert_eq!(records[1].from, "s01");
        assert_eq!(records[1].to, "s02");
        assert_eq!(records[2].to, "__off");
    }

    #[test]
    fn history_preserves_requested_key_on_redirect() {
        let trace = Trace::default();
        let mut fsm = Fsm::new("redirect-history", Sentinels::default());
        fsm.add_state(
            "a".to_string(),
            traced_hooks(&trace, "a").with_filter(|_, _, args| {
                FilterResult::redirect("b".to_string(), args.clone())
            }),
        );
        fsm.add_state("b".to_string(), traced_hooks(&trace, "b"));

        fsm.request("a".to_string());
        fsm.request("a".to_string());

        let records = fsm.history().transitions();
        assert_eq!(records[1].requested, "a");
        assert_eq!(records[1].to, "b");
    }

    #[test]
    fn take_history_resets_the_record() {
        let trace = Trace::default();
        let mut fsm = traced_fsm(&trace);
        fsm.request("s01".to_string());

        let taken = fsm.take_history();
        assert_eq!(taken.len(), 1);
        assert!(fsm.history().is_empty());
    }
}
