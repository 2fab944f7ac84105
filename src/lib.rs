//! `compartment-fit` library crate.
//!
//! Fits the conductances and capacitances of a compartment tree (an RC network
//! on a rooted tree) to target impedance matrices by linear least squares.
//! The binary (`ctfit`) is a thin wrapper that validates the fitter on random
//! trees with known parameters.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod tree;
