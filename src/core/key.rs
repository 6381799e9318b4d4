//! Key traits and reserved sentinel values.
//!
//! A machine is generic over its state key type. Any hashable, comparable,
//! serializable value works as a key: strings, integers, or serde-derived
//! enums. Three reserved values per key type give the machine its `Off`,
//! `Null`, and `InTransition` meanings without colliding with user states.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::builder::BuildError;

/// Marker trait for state key types.
///
/// Blanket-implemented for every type with the required capabilities, so
/// user code never implements it by hand.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: keys index the state registry and the from-to
///   table
/// - `Debug`: keys appear in diagnostics
/// - `Serialize` + `Deserialize`: keys appear in history records, transition
///   tables, and checkpoints
///
/// # Example
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use stance::{Fsm, Sentinels, StateHooks};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum DoorState {
///     Off,
///     Null,
///     Moving,
///     Open,
///     Closed,
/// }
///
/// let sentinels = Sentinels::new(DoorState::Off, DoorState::Null, DoorState::Moving).unwrap();
/// let mut door = Fsm::new("door", sentinels);
/// door.add_state(DoorState::Open, StateHooks::new());
/// door.add_state(DoorState::Closed, StateHooks::new());
/// door.request(DoorState::Open);
/// assert_eq!(door.current_or_next_state(), &DoorState::Open);
/// ```
pub trait StateKey:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

impl<T> StateKey for T where
    T: Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

/// Marker trait for event types consumed by the table-driven driver.
///
/// Same capability set as [`StateKey`]; events index transition tables and
/// may be loaded from serialized rule lists.
pub trait EventKey:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

impl<T> EventKey for T where
    T: Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

/// The three reserved key values a machine is constructed with.
///
/// - `off`: the machine's state after construction and after `cleanup()`
/// - `null`: "no next state"; a filter returning this value abandons the
///   request
/// - `in_transition`: the value reported by `current_or_next_state()` while
///   a transition is being processed
///
/// The three values must be pairwise distinct, and none of them may be
/// registered as an ordinary state. `Default` implementations exist for
/// `String` (`"__off"`, `"__null"`, `"__in_transition"`) and the signed
/// integer types (`-1`, `-2`, `-3`).
///
/// # Example
///
/// ```rust
/// use stance::Sentinels;
///
/// let sentinels: Sentinels<String> = Sentinels::default();
/// assert_eq!(sentinels.off(), "__off");
///
/// let collision = Sentinels::new(0, 0, -1);
/// assert!(collision.is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sentinels<K> {
    off: K,
    null: K,
    in_transition: K,
}

impl<K: StateKey> Sentinels<K> {
    /// Create a sentinel set, checking that the three values are distinct.
    pub fn new(off: K, null: K, in_transition: K) -> Result<Self, BuildError> {
        if off == null || off == in_transition || null == in_transition {
            return Err(BuildError::SentinelCollision);
        }
        Ok(Self {
            off,
            null,
            in_transition,
        })
    }

    /// The terminal/uninitialized state value.
    pub fn off(&self) -> &K {
        &self.off
    }

    /// The "no next state" value.
    pub fn null(&self) -> &K {
        &self.null
    }

    /// The "transition in progress" value.
    pub fn in_transition(&self) -> &K {
        &self.in_transition
    }

    /// Check whether a key is one of the three reserved values.
    pub fn is_reserved(&self, key: &K) -> bool {
        *key == self.off || *key == self.null || *key == self.in_transition
    }
}

impl Default for Sentinels<String> {
    fn default() -> Self {
        Self {
            off: "__off".to_string(),
            null: "__null".to_string(),
            in_transition: "__in_transition".to_string(),
        }
    }
}

macro_rules! numeric_sentinels {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Default for Sentinels<$ty> {
                fn default() -> Self {
                    Self {
                        off: -1,
                        null: -2,
                        in_transition: -3,
                    }
                }
            }
        )*
    };
}

numeric_sentinels!(i8, i16, i32, i64);
