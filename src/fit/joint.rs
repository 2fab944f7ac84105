//! Experimental: fit conductances and capacitances in one least-squares solve.
//!
//! The validated path is `compute_gc` (conductances at steady state, then
//! capacitances). This routine solves `Zf · (G + s C) = I` for all unknowns at
//! once over the combined layout. It is kept as an opt-in alternative and is not
//! covered by the round-trip guarantees of the two-stage fit; whether the joint
//! problem is well posed for measured (non-exact) targets is still open.

use log::debug;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::domain::{FitDiagnostics, ParamFamily};
use crate::error::{FitError, Result};
use crate::fit::fitter::{check_frequency_targets, fill_feature_rows, fill_target_rows, report};
use crate::fit::layout::ParamLayout;
use crate::fit::structure::frequency_structures;
use crate::math::solve_least_squares;
use crate::tree::CompartmentTree;

impl CompartmentTree {
    /// Fit leak, coupling and capacitance in a single solve (experimental).
    ///
    /// Only the real part of the solution is written back.
    pub fn compute_gc_joint(
        &mut self,
        freqs: &[Complex64],
        zf_mat: &[DMatrix<Complex64>],
    ) -> Result<FitDiagnostics> {
        let n = self.len();
        if n == 0 {
            return Err(FitError::EmptyTree);
        }
        check_frequency_targets(n, freqs, zf_mat)?;

        let layout = ParamLayout::new(self, ParamFamily::Combined);
        let gc_struct = frequency_structures(self, &layout, freqs)?;
        let eye = DMatrix::<Complex64>::identity(n, n);

        let block = n * n;
        let mut mat_feature = DMatrix::<Complex64>::zeros(freqs.len() * block, layout.len());
        let mut vec_target = DVector::<Complex64>::zeros(freqs.len() * block);
        for (o, (zf, s)) in zf_mat.iter().zip(&gc_struct).enumerate() {
            fill_feature_rows(&mut mat_feature, o * block, zf, s);
            fill_target_rows(&mut vec_target, o * block, &eye);
        }
        debug!(
            "joint fit: {} frequencies, feature matrix {}x{}",
            freqs.len(),
            mat_feature.nrows(),
            mat_feature.ncols()
        );

        let sol = solve_least_squares(&mat_feature, &vec_target, "joint fit")?;
        layout.write(self, &sol.x.map(|v| v.re))?;

        Ok(report("joint fit", &mat_feature, &sol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CompartmentParams;
    use approx::assert_relative_eq;

    #[test]
    fn joint_fit_recovers_exact_targets() {
        let truth = CompartmentTree::from_parents(
            &[None, Some(0), Some(1)],
            &[
                CompartmentParams::new(1.1, 0.01, 0.0),
                CompartmentParams::new(0.7, 0.006, 0.03),
                CompartmentParams::new(1.6, 0.004, 0.02),
            ],
        )
        .unwrap();
        let freqs = vec![
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.05),
            Complex64::new(0.0, 0.5),
        ];
        let zf = truth.impedance_matrices(&freqs).unwrap();

        let mut fit = truth.with_same_topology();
        let diag = fit.compute_gc_joint(&freqs, &zf).unwrap();
        assert_eq!(diag.params, 2 + 3 * 2);
        assert_eq!(diag.rank, diag.params);

        for (a, b) in fit.nodes().zip(truth.nodes()) {
            assert_relative_eq!(a.params.g_l, b.params.g_l, max_relative = 1e-6);
            assert_relative_eq!(a.params.ca, b.params.ca, max_relative = 1e-6);
            if !a.is_root() {
                assert_relative_eq!(a.params.g_c, b.params.g_c, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn joint_fit_validates_inputs() {
        let mut tree = CompartmentTree::with_root(CompartmentParams::default());
        let zf = vec![DMatrix::<Complex64>::identity(1, 1)];
        assert!(tree.compute_gc_joint(&[], &[]).is_err());
        assert!(tree
            .compute_gc_joint(&[Complex64::new(0.0, 1.0), Complex64::new(0.0, 2.0)], &zf)
            .is_err());
    }
}
