//! Conductance, system and impedance matrices of a compartment tree.
//!
//! All matrices use the tree's canonical node order on both axes. The
//! conductance matrix is the weighted Laplacian of the tree (coupling
//! conductances as edge weights) plus the leak conductances on the diagonal;
//! the system matrix adds `freq * ca` on the diagonal for each frequency.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{FitError, Result};
use crate::tree::CompartmentTree;

impl CompartmentTree {
    /// Steady-state conductance matrix `G`.
    pub fn conductance_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut g_mat = DMatrix::<f64>::zeros(n, n);
        for node in self.nodes() {
            let ii = node.index();
            g_mat[(ii, ii)] += node.params.g_l;
            if let Some(jj) = node.parent() {
                let g_c = node.params.g_c;
                g_mat[(ii, ii)] += g_c;
                g_mat[(jj, jj)] += g_c;
                g_mat[(ii, jj)] -= g_c;
                g_mat[(jj, ii)] -= g_c;
            }
        }
        g_mat
    }

    /// System matrices `G + diag(freq * ca)`, one per frequency.
    ///
    /// The result is complex even for purely real frequencies.
    pub fn system_matrices(&self, freqs: &[Complex64]) -> Vec<DMatrix<Complex64>> {
        let g_mat = to_complex(&self.conductance_matrix());
        freqs
            .iter()
            .map(|&freq| {
                let mut m = g_mat.clone();
                for node in self.nodes() {
                    let ii = node.index();
                    m[(ii, ii)] += freq * node.params.ca;
                }
                m
            })
            .collect()
    }

    /// Steady-state impedance matrix `G^-1`.
    pub fn impedance_matrix(&self) -> Result<DMatrix<f64>> {
        if self.is_empty() {
            return Err(FitError::EmptyTree);
        }
        self.conductance_matrix()
            .try_inverse()
            .ok_or(FitError::SingularMatrix {
                matrix: "conductance matrix",
                freq_index: None,
            })
    }

    /// Impedance matrices, the inverse of each system matrix.
    pub fn impedance_matrices(&self, freqs: &[Complex64]) -> Result<Vec<DMatrix<Complex64>>> {
        if self.is_empty() {
            return Err(FitError::EmptyTree);
        }
        self.system_matrices(freqs)
            .into_iter()
            .enumerate()
            .map(|(k, m)| {
                m.try_inverse().ok_or(FitError::SingularMatrix {
                    matrix: "system matrix",
                    freq_index: Some(k),
                })
            })
            .collect()
    }
}

/// Promote a real matrix to a complex one.
pub fn to_complex(m: &DMatrix<f64>) -> DMatrix<Complex64> {
    m.map(|x| Complex64::new(x, 0.0))
}

/// Frobenius relative error `‖model - target‖ / ‖target‖`, summed over frequencies.
pub fn relative_error(model: &[DMatrix<Complex64>], target: &[DMatrix<Complex64>]) -> Result<f64> {
    if model.len() != target.len() {
        return Err(FitError::dims("number of impedance matrices", target.len(), model.len()));
    }
    let mut diff_sq = 0.0;
    let mut norm_sq = 0.0;
    for (m, t) in model.iter().zip(target) {
        if m.shape() != t.shape() {
            return Err(FitError::dims(
                "impedance matrix shape",
                format!("{:?}", t.shape()),
                format!("{:?}", m.shape()),
            ));
        }
        diff_sq += (m - t).norm_squared();
        norm_sq += t.norm_squared();
    }
    if norm_sq == 0.0 {
        return Ok(diff_sq.sqrt());
    }
    Ok((diff_sq / norm_sq).sqrt())
}
