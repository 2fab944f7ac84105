//! Synthetic inputs for validation runs and tests.

pub mod synthetic;

pub use synthetic::*;
