//! Core data types for the state machine.
//!
//! This module contains the vocabulary the machine is built from:
//! - Key traits and reserved sentinel values
//! - Per-state hook slots and the filter verdict type
//! - Immutable transition history

pub mod history;
pub mod key;
pub mod state;

pub use history::{StateHistory, TransitionRecord};
pub use key::{EventKey, Sentinels, StateKey};
pub use state::{ArgList, EnterFn, ExitFn, FilterFn, FilterResult, FromToFn, StateHooks};
