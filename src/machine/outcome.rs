//! Observable results of driving the machine.

use crate::core::key::StateKey;

/// What a `request` or `demand` call did.
///
/// This is informational, not an error channel: every variant is a
/// non-fatal outcome the machine has already handled. Callers that only
/// care about the state can ignore it and query the machine instead.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestOutcome<K> {
    /// The full exit → from-to → enter sequence ran and the machine
    /// settled in `to`.
    Transitioned { from: K, to: K },
    /// The requested key is not registered; nothing changed.
    Unknown(K),
    /// The current state's filter abandoned the request; nothing changed.
    Rejected(K),
    /// The call arrived mid-transition and was queued for replay once the
    /// machine settles.
    Deferred(K),
    /// The call arrived mid-transition and the pending queue was full.
    Dropped(K),
    /// A nested `demand` or `cleanup` inside one of this transition's hooks
    /// took over; the nested result stands.
    Superseded,
}

impl<K: StateKey> RequestOutcome<K> {
    /// Whether this call completed a transition itself.
    pub fn is_transitioned(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}

/// Dual-mode view of where the machine is right now.
///
/// Outside of a transition the machine is settled in exactly one state.
/// Hooks running inside a transition observe the old and new keys instead,
/// which is how an enter/exit/filter/from-to callback learns where it sits
/// in the transition without the machine exposing two separate fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurrentState<'a, K> {
    /// Not transitioning; the machine is in this state.
    Settled(&'a K),
    /// A transition from `from` to `to` is being processed.
    InTransition { from: &'a K, to: &'a K },
}

impl<'a, K> CurrentState<'a, K> {
    /// The settled state, if not mid-transition.
    pub fn settled(&self) -> Option<&'a K> {
        match self {
            Self::Settled(key) => Some(key),
            Self::InTransition { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_transitioned_only_for_completed_transitions() {
        let done: RequestOutcome<String> = RequestOutcome::Transitioned {
            from: "a".to_string(),
            to: "b".to_string(),
        };
        assert!(done.is_transitioned());

        let ignored: RequestOutcome<String> = RequestOutcome::Unknown("x".to_string());
        assert!(!ignored.is_transitioned());
        assert!(!RequestOutcome::<String>::Superseded.is_transitioned());
    }

    #[test]
    fn settled_projects_only_the_idle_case() {
        let a = "a".to_string();
        let b = "b".to_string();

        let settled = CurrentState::Settled(&a);
        assert_eq!(settled.settled(), Some(&a));

        let transitioning = CurrentState::InTransition { from: &a, to: &b };
        assert_eq!(transitioning.settled(), None);
    }
}
