//! Input/output helpers.
//!
//! - parameter snapshot JSON read/write (`snapshot`)

pub mod snapshot;

pub use snapshot::*;
