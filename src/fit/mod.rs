//! Parameter fitting.
//!
//! Responsibilities:
//!
//! - map `(node, parameter kind)` to flat-vector slots (`layout`)
//! - build structure tensors from the tree topology (`structure`)
//! - solve the conductance and capacitance fits (`fitter`)
//! - fit many independent trees (parallel) (`batch`)
//! - the experimental single-solve fit (`joint`)

pub mod batch;
pub mod fitter;
pub mod joint;
pub mod layout;
pub mod structure;

pub use batch::*;
pub use fitter::*;
pub use layout::*;
pub use structure::*;
