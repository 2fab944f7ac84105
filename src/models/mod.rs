//! Electrical model of a compartment tree.
//!
//! Matrices are built as small, pure functions of the current node parameters
//! so that fitting code and validation code share one definition.

pub mod matrices;

pub use matrices::*;
