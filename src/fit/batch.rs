//! Fit many independent trees in parallel.
//!
//! A single tree is fitted in place and is never shared between threads; each
//! task owns its tree and its targets, so tasks run on the rayon pool without
//! synchronization.

use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::domain::TwoStageDiagnostics;
use crate::error::Result;
use crate::tree::CompartmentTree;

/// One independent two-stage fit.
#[derive(Debug, Clone)]
pub struct FitTask {
    pub tree: CompartmentTree,
    pub freqs: Vec<Complex64>,
    pub zf_mat: Vec<DMatrix<Complex64>>,
    /// Explicit steady-state target; `None` uses the zero frequency in `freqs`.
    pub z_mat: Option<DMatrix<f64>>,
}

impl FitTask {
    pub fn run(&mut self) -> Result<TwoStageDiagnostics> {
        self.tree
            .compute_gc(&self.freqs, &self.zf_mat, self.z_mat.as_ref())
    }
}

/// Run `compute_gc` on every task (parallel). Results are in task order.
pub fn fit_batch(tasks: &mut [FitTask]) -> Vec<Result<TwoStageDiagnostics>> {
    tasks.par_iter_mut().map(FitTask::run).collect()
}
