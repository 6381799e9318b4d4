//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder that validates sentinel and state
//! key choices up front, so misconfigurations surface at construction time
//! instead of as silently-ignored registrations.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::FsmBuilder;
