//! Mathematical utilities: SVD least squares.

pub mod lstsq;

pub use lstsq::*;
