//! Reporting utilities: parameter comparisons, solver diagnostics and tree dumps.
//!
//! Formatting lives here so the fitting code stays free of output concerns.

pub mod format;

pub use format::*;
