//! Least-squares fitting of conductances and capacitances.
//!
//! Given a target steady-state impedance `Z`, the conductance matrix `G` should
//! satisfy `Z · G = I`. Writing `G = Σ_k x[k] S[:,:,k]` (see `fit::structure`)
//! turns this into a linear problem in `x`:
//!
//! ```text
//! A[(i,k), l] = Σ_j Z[i,j] S[j,k,l]      b[(i,k)] = I[i,k]
//! ```
//!
//! The capacitance fit does the same per frequency with `Zf · (G + s C) = I`,
//! moving the known `Zf · G` to the target side. Rows are flattened row-major
//! over `(frequency, i, k)`.
//!
//! Conductances must be fit before capacitances: the capacitance target uses
//! the tree's current `G`. This order is the caller's responsibility.

use log::{debug, info, warn};
use nalgebra::{ComplexField, DMatrix, DVector};
use num_complex::Complex64;

use crate::domain::{FitDiagnostics, ParamFamily, TwoStageDiagnostics};
use crate::error::{FitError, Result};
use crate::fit::layout::ParamLayout;
use crate::fit::structure::{StructureTensor, conductance_structure, frequency_structures};
use crate::math::{LstsqSolution, solve_least_squares};
use crate::models::to_complex;
use crate::tree::CompartmentTree;

/// Frequencies with `|f|` below this count as zero when locating the steady state.
pub const ZERO_FREQ_TOL: f64 = 1e-12;

/// Index of the first frequency within `ZERO_FREQ_TOL` of zero.
pub fn zero_frequency_index(freqs: &[Complex64]) -> Option<usize> {
    freqs.iter().position(|f| f.norm() < ZERO_FREQ_TOL)
}

impl CompartmentTree {
    /// Fit leak and coupling conductances to a steady-state impedance matrix.
    ///
    /// Overwrites `g_l` of every node and `g_c` of every non-root node.
    pub fn compute_g(&mut self, z_mat: &DMatrix<f64>) -> Result<FitDiagnostics> {
        let n = self.len();
        if n == 0 {
            return Err(FitError::EmptyTree);
        }
        check_square("steady-state impedance shape", z_mat, n)?;
        check_finite("steady-state impedance", z_mat, None)?;

        let layout = ParamLayout::new(self, ParamFamily::Conductance);
        let g_struct = conductance_structure(self, &layout)?;

        let mut mat_feature = DMatrix::<f64>::zeros(n * n, layout.len());
        let mut vec_target = DVector::<f64>::zeros(n * n);
        fill_feature_rows(&mut mat_feature, 0, z_mat, &g_struct);
        fill_target_rows(&mut vec_target, 0, &DMatrix::identity(n, n));
        debug!(
            "conductance fit: feature matrix {}x{}",
            mat_feature.nrows(),
            mat_feature.ncols()
        );

        let sol = solve_least_squares(&mat_feature, &vec_target, "conductance fit")?;
        layout.write(self, &sol.x)?;

        Ok(report("conductance fit", &mat_feature, &sol))
    }

    /// Fit capacitances to impedance matrices evaluated at `freqs`.
    ///
    /// Assumes the conductances are already fitted; the target is
    /// `I - Zf · G` with the tree's current `G`. Only the real part of the
    /// least-squares solution is kept.
    ///
    /// Logs a warning when every node still carries the placeholder `g_l` and
    /// `g_c`, which usually means `compute_g` was not called first. The fit
    /// still runs.
    pub fn compute_c(&mut self, freqs: &[Complex64], zf_mat: &[DMatrix<Complex64>]) -> Result<FitDiagnostics> {
        let n = self.len();
        if n == 0 {
            return Err(FitError::EmptyTree);
        }
        check_frequency_targets(n, freqs, zf_mat)?;
        if self.nodes().all(|node| node.params.has_placeholder_conductances()) {
            warn!("capacitance fit on a tree whose conductances look unfit; call compute_g first");
        }

        let layout = ParamLayout::new(self, ParamFamily::Capacitance);
        let c_struct = frequency_structures(self, &layout, freqs)?;
        let g_mat = to_complex(&self.conductance_matrix());
        let eye = DMatrix::<Complex64>::identity(n, n);

        let block = n * n;
        let mut mat_feature = DMatrix::<Complex64>::zeros(freqs.len() * block, layout.len());
        let mut vec_target = DVector::<Complex64>::zeros(freqs.len() * block);
        for (o, (zf, s)) in zf_mat.iter().zip(&c_struct).enumerate() {
            fill_feature_rows(&mut mat_feature, o * block, zf, s);
            fill_target_rows(&mut vec_target, o * block, &(&eye - zf * &g_mat));
        }
        debug!(
            "capacitance fit: {} frequencies, feature matrix {}x{}",
            freqs.len(),
            mat_feature.nrows(),
            mat_feature.ncols()
        );

        let sol = solve_least_squares(&mat_feature, &vec_target, "capacitance fit")?;
        let c_vec = sol.x.map(|c| c.re);
        layout.write(self, &c_vec)?;

        Ok(report("capacitance fit", &mat_feature, &sol))
    }

    /// Fit conductances, then capacitances.
    ///
    /// When `z_mat` is `None`, the steady-state target is the real part of
    /// `zf_mat` at the first zero frequency in `freqs`; if there is none this
    /// fails with `FitError::MissingZeroFrequency`.
    pub fn compute_gc(
        &mut self,
        freqs: &[Complex64],
        zf_mat: &[DMatrix<Complex64>],
        z_mat: Option<&DMatrix<f64>>,
    ) -> Result<TwoStageDiagnostics> {
        if self.is_empty() {
            return Err(FitError::EmptyTree);
        }
        check_frequency_targets(self.len(), freqs, zf_mat)?;
        let steady = match z_mat {
            Some(z) => z.clone(),
            None => {
                let k = zero_frequency_index(freqs)
                    .ok_or(FitError::MissingZeroFrequency { tol: ZERO_FREQ_TOL })?;
                debug!("using frequency index {k} as steady state");
                zf_mat[k].map(|z| z.re)
            }
        };

        let conductance = self.compute_g(&steady)?;
        let capacitance = self.compute_c(freqs, zf_mat)?;
        Ok(TwoStageDiagnostics {
            conductance,
            capacitance,
        })
    }
}

pub(crate) fn check_square<T: ComplexField<RealField = f64>>(
    what: &'static str,
    m: &DMatrix<T>,
    n: usize,
) -> Result<()> {
    if m.shape() != (n, n) {
        return Err(FitError::dims(what, format!("({n}, {n})"), format!("{:?}", m.shape())));
    }
    Ok(())
}

pub(crate) fn check_frequency_targets(
    n: usize,
    freqs: &[Complex64],
    zf_mat: &[DMatrix<Complex64>],
) -> Result<()> {
    if freqs.is_empty() {
        return Err(FitError::dims("number of frequencies", "at least 1", 0));
    }
    if freqs.len() != zf_mat.len() {
        return Err(FitError::dims("number of impedance matrices", freqs.len(), zf_mat.len()));
    }
    for (k, f) in freqs.iter().enumerate() {
        if !f.is_finite() {
            return Err(FitError::NonFiniteInput {
                what: "frequency",
                freq_index: Some(k),
            });
        }
    }
    for (k, zf) in zf_mat.iter().enumerate() {
        check_square("frequency impedance shape", zf, n)?;
        check_finite("frequency impedance", zf, Some(k))?;
    }
    Ok(())
}

pub(crate) fn check_finite<T: ComplexField<RealField = f64>>(
    what: &'static str,
    m: &DMatrix<T>,
    freq_index: Option<usize>,
) -> Result<()> {
    if m.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(FitError::NonFiniteInput { what, freq_index })
    }
}

/// Write `vec(Z · S[:,:,l])` into column `l`, starting at `row_offset`.
pub(crate) fn fill_feature_rows<T: ComplexField<RealField = f64>>(
    mat_feature: &mut DMatrix<T>,
    row_offset: usize,
    z_mat: &DMatrix<T>,
    structure: &StructureTensor<T>,
) {
    let n = structure.n_nodes();
    for (l, slice) in structure.slices().iter().enumerate() {
        let prod = z_mat * slice;
        for i in 0..n {
            for k in 0..n {
                mat_feature[(row_offset + i * n + k, l)] = prod[(i, k)].clone();
            }
        }
    }
}

/// Write `vec(target)` (row-major), starting at `row_offset`.
pub(crate) fn fill_target_rows<T: ComplexField<RealField = f64>>(
    vec_target: &mut DVector<T>,
    row_offset: usize,
    target: &DMatrix<T>,
) {
    let n = target.nrows();
    for i in 0..n {
        for k in 0..target.ncols() {
            vec_target[row_offset + i * n + k] = target[(i, k)].clone();
        }
    }
}

pub(crate) fn report<T: ComplexField<RealField = f64>>(
    stage: &str,
    mat_feature: &DMatrix<T>,
    sol: &LstsqSolution<T>,
) -> FitDiagnostics {
    let diag = FitDiagnostics {
        rows: mat_feature.nrows(),
        params: mat_feature.ncols(),
        rank: sol.rank,
        residual_norm: sol.residual_norm,
    };
    if diag.is_rank_deficient() {
        warn!(
            "{stage}: feature matrix is rank deficient (rank {} < {} parameters); using minimum-norm solution",
            diag.rank, diag.params
        );
    }
    info!(
        "{stage}: {} parameters, rank {}, residual {:.3e}",
        diag.params, diag.rank, diag.residual_norm
    );
    diag
}
