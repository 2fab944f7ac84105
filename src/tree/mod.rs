//! Compartment tree data model.

pub mod compartment_tree;
pub mod node;

pub use compartment_tree::*;
pub use node::*;
