//! Minimum-norm linear least squares.
//!
//! Every fit in this crate reduces to
//!
//! ```text
//! minimize ‖A x - b‖²
//! ```
//!
//! with a tall feature matrix `A` (one row per matrix cell, and per frequency
//! for the capacitance fits) and one column per unknown parameter.
//!
//! Implementation choices:
//! - We use SVD for all solves. nalgebra's `QR::solve` is intended for square
//!   systems, while SVD handles tall and rank-deficient matrices alike.
//! - Singular values below `eps * max(m, n) * σ_max` are treated as zero, which
//!   yields the minimum-norm solution for rank-deficient `A` (the usual LAPACK
//!   `gelsd` cutoff).
//! - The solver is generic over real and complex scalars: conductance fits are
//!   real, capacitance fits are complex.

use nalgebra::{ComplexField, DMatrix, DVector};

use crate::error::{FitError, Result};

/// Iteration cap for the SVD; nalgebra's plain `svd()` loops forever when it
/// does not converge.
pub const SVD_MAX_ITER: usize = 10_000;

/// Solution of a least-squares problem plus solver diagnostics.
#[derive(Debug, Clone)]
pub struct LstsqSolution<T: ComplexField<RealField = f64>> {
    pub x: DVector<T>,
    /// Number of singular values above the cutoff.
    pub rank: usize,
    /// `‖A x - b‖` at the solution.
    pub residual_norm: f64,
    pub singular_values: DVector<f64>,
}

/// Solve a least squares problem using SVD.
///
/// `stage` names the fit in error messages.
pub fn solve_least_squares<T>(
    a: &DMatrix<T>,
    b: &DVector<T>,
    stage: &'static str,
) -> Result<LstsqSolution<T>>
where
    T: ComplexField<RealField = f64>,
{
    let (m, n) = a.shape();
    if b.len() != m {
        return Err(FitError::dims("target vector length", m, b.len()));
    }
    if m == 0 || n == 0 {
        return Err(FitError::LeastSquares {
            stage,
            reason: format!("empty system ({m}x{n})"),
        });
    }

    if !(a.iter().all(|v| v.is_finite()) && b.iter().all(|v| v.is_finite())) {
        return Err(FitError::LeastSquares {
            stage,
            reason: "non-finite entry in the system".to_string(),
        });
    }

    let svd = a
        .clone()
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITER)
        .ok_or_else(|| FitError::LeastSquares {
            stage,
            reason: format!("SVD did not converge within {SVD_MAX_ITER} iterations"),
        })?;
    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = f64::EPSILON * m.max(n) as f64 * s_max;
    let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();

    let x = svd.solve(b, cutoff).map_err(|reason| FitError::LeastSquares {
        stage,
        reason: reason.to_string(),
    })?;
    if !x.iter().all(|v| v.is_finite()) {
        return Err(FitError::LeastSquares {
            stage,
            reason: "non-finite solution".to_string(),
        });
    }

    let residual_norm = (a * &x - b).norm();

    Ok(LstsqSolution {
        x,
        rank,
        residual_norm,
        singular_values: svd.singular_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let sol = solve_least_squares(&x, &y, "test").unwrap();
        assert!((sol.x[0] - 2.0).abs() < 1e-10);
        assert!((sol.x[1] - 3.0).abs() < 1e-10);
        assert_eq!(sol.rank, 2);
        assert!(sol.residual_norm < 1e-10);
    }

    #[test]
    fn rank_deficient_system_gives_minimum_norm_solution() {
        // Two identical columns: every x with x0 + x1 = 2 fits, minimum norm is (1, 1).
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_row_slice(&[2.0, 2.0, 2.0]);

        let sol = solve_least_squares(&a, &b, "test").unwrap();
        assert_eq!(sol.rank, 1);
        assert!((sol.x[0] - 1.0).abs() < 1e-10);
        assert!((sol.x[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn complex_system_recovers_real_solution() {
        let i = Complex64::new(0.0, 1.0);
        let one = Complex64::new(1.0, 0.0);
        let a = DMatrix::from_row_slice(3, 1, &[i, one, i * 2.0]);
        let b = DVector::from_row_slice(&[i * 0.5, one * 0.5, i]);

        let sol = solve_least_squares(&a, &b, "test").unwrap();
        assert!((sol.x[0] - Complex64::new(0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn overdetermined_inconsistent_system_reports_residual() {
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let b = DVector::from_row_slice(&[0.0, 2.0]);

        let sol = solve_least_squares(&a, &b, "test").unwrap();
        assert!((sol.x[0] - 1.0).abs() < 1e-12);
        assert!((sol.residual_norm - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn non_finite_system_is_an_error() {
        let mut a = DMatrix::<f64>::identity(3, 2);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        a[(1, 0)] = f64::NAN;
        assert!(matches!(
            solve_least_squares(&a, &b, "test"),
            Err(FitError::LeastSquares { stage: "test", .. })
        ));

        let a = DMatrix::<f64>::identity(3, 2);
        let b = DVector::from_row_slice(&[1.0, f64::INFINITY, 3.0]);
        assert!(solve_least_squares(&a, &b, "test").is_err());
    }

    #[test]
    fn rejects_mismatched_target() {
        let a = DMatrix::<f64>::identity(2, 2);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            solve_least_squares(&a, &b, "test"),
            Err(FitError::DimensionMismatch { .. })
        ));
    }
}
