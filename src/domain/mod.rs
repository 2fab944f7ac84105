//! Domain types used throughout the fitting pipeline.
//!
//! This module defines:
//!
//! - per-compartment parameters (`CompartmentParams`)
//! - parameter kinds and fit families (`ParamKind`, `ParamFamily`)
//! - solver diagnostics returned by the fits (`FitDiagnostics`)

pub mod types;

pub use types::*;
