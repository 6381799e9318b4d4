//! Stance: a callback-driven finite state machine library
//!
//! A machine owns a set of named states, each carrying optional enter,
//! exit, and filter hooks, plus a sparse table of directed from-to hooks.
//! All state changes flow through a `request`/`demand` protocol that
//! composes those hooks in a fixed order — filter, exit, from-to, enter —
//! while keeping reentrant calls from corrupting a transition in progress.
//! A table-driven event driver turns `(state, event) → next state` data
//! into requests.
//!
//! # Core Concepts
//!
//! - **State**: a key plus optional hooks, registered at runtime
//! - **Filter**: lets the *current* state accept, redirect, or reject an
//!   incoming request before anything runs
//! - **Request vs. demand**: `request` defers reentrant calls until the
//!   machine settles; `demand` forces an immediate nested transition from
//!   inside a hook
//! - **Sentinels**: three reserved key values (`off`, `null`,
//!   `in_transition`) giving the machine its lifecycle meanings without
//!   colliding with user states
//!
//! # Example
//!
//! ```rust
//! use stance::{Fsm, Sentinels, StateHooks};
//!
//! let mut fsm = Fsm::new("door", Sentinels::default());
//! fsm.add_state(
//!     "open".to_string(),
//!     StateHooks::new().on_enter(|_, _| println!("door is open")),
//! );
//! fsm.add_state(
//!     "closed".to_string(),
//!     StateHooks::new().on_exit(|_| println!("unlatching")),
//! );
//!
//! fsm.request("closed".to_string());
//! fsm.request("open".to_string());
//! assert_eq!(fsm.current_or_next_state(), "open");
//!
//! fsm.cleanup();
//! assert!(fsm.is_off());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod driver;
pub mod machine;

// Re-export commonly used types
pub use crate::core::{
    ArgList, EventKey, FilterResult, Sentinels, StateHistory, StateHooks, StateKey,
    TransitionRecord,
};
pub use builder::{BuildError, FsmBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use driver::{EventDriver, TransitionRule, TransitionTable};
pub use machine::{CurrentState, Fsm, RequestOutcome};
