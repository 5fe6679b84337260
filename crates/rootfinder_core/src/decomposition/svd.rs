//! Singular value decomposition with singular-value truncation.

use super::{validate_rhs, validate_square, Decomposition, DecompositionResult};
use crate::linalg::{DoubleMatrix, DoubleVector};
use crate::types::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Iteration cap handed to the nalgebra SVD kernel.
const MAX_SVD_ITERATIONS: usize = 1000;

/// Singular value decomposition `A = U·Σ·Vᵀ`.
///
/// Singular values at or below `relative_tolerance × σ_max` are treated as
/// zero: their reciprocal in the pseudo-inverse is set to zero rather than
/// amplified. Solves on a rank-deficient matrix therefore return the
/// minimum-norm least-squares solution instead of failing.
///
/// # Example
///
/// ```
/// use rootfinder_core::decomposition::{Decomposition, SvdDecomposition};
/// use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
///
/// // Rank one: the second column is twice the first.
/// let a = DoubleMatrix::new(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
/// let svd = SvdDecomposition::default().decompose(&a).unwrap();
///
/// let x = svd.solve(&DoubleVector::new(vec![5.0, 10.0])).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SvdDecomposition {
    /// Relative singular value cut-off; `None` means `N × f64::EPSILON`.
    relative_tolerance: Option<f64>,
}

impl SvdDecomposition {
    /// SVD with an explicit relative cut-off.
    pub fn with_relative_tolerance(relative_tolerance: f64) -> Self {
        Self {
            relative_tolerance: Some(relative_tolerance),
        }
    }

    /// Relative cut-off applied to an N×N matrix.
    pub fn relative_tolerance(&self, n: usize) -> f64 {
        self.relative_tolerance.unwrap_or(n as f64 * f64::EPSILON)
    }

    /// Factorize and return the concrete result type.
    ///
    /// Same as [`Decomposition::decompose`] but exposes the singular values.
    pub fn decompose_svd(&self, matrix: &DoubleMatrix) -> SolverResult<SvdDecompositionResult> {
        validate_square(matrix, self.name())?;
        let size = matrix.rows();
        let svd = matrix
            .as_dmatrix()
            .clone()
            .try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
            .ok_or_else(|| SolverError::invalid_argument("SVD kernel did not converge"))?;

        let u = svd
            .u
            .ok_or_else(|| SolverError::invalid_argument("SVD did not produce U"))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| SolverError::invalid_argument("SVD did not produce Vᵀ"))?;
        let singular_values = svd.singular_values;

        let max_singular = singular_values.iter().fold(0.0_f64, |acc, s| acc.max(*s));
        let threshold = self.relative_tolerance(size) * max_singular;

        Ok(SvdDecompositionResult {
            u,
            v_t,
            singular_values,
            threshold,
            size,
        })
    }
}

impl Decomposition for SvdDecomposition {
    fn name(&self) -> &'static str {
        "SVD"
    }

    fn decompose(&self, matrix: &DoubleMatrix) -> SolverResult<Box<dyn DecompositionResult>> {
        Ok(Box::new(self.decompose_svd(matrix)?))
    }
}

/// Factorized form produced by [`SvdDecomposition`].
#[derive(Debug, Clone)]
pub struct SvdDecompositionResult {
    u: DMatrix<f64>,
    v_t: DMatrix<f64>,
    singular_values: DVector<f64>,
    threshold: f64,
    size: usize,
}

impl SvdDecompositionResult {
    /// Singular values in the order produced by the kernel.
    pub fn singular_values(&self) -> DoubleVector {
        DoubleVector::from_dvector(self.singular_values.clone())
    }

    /// Number of singular values above the cut-off.
    pub fn rank(&self) -> usize {
        self.singular_values
            .iter()
            .filter(|s| **s > self.threshold)
            .count()
    }

    /// Ratio σ_max / σ_min; infinite when σ_min is below the cut-off.
    pub fn condition_number(&self) -> f64 {
        let max = self.singular_values.iter().fold(0.0_f64, |acc, s| acc.max(*s));
        let min = self
            .singular_values
            .iter()
            .fold(f64::INFINITY, |acc, s| acc.min(*s));
        if min <= self.threshold {
            f64::INFINITY
        } else {
            max / min
        }
    }

    /// Reciprocals of the singular values, zeroed below the cut-off.
    fn truncated_reciprocals(&self) -> DVector<f64> {
        self.singular_values
            .map(|s| if s > self.threshold { 1.0 / s } else { 0.0 })
    }
}

impl DecompositionResult for SvdDecompositionResult {
    fn solve(&self, b: &DoubleVector) -> SolverResult<DoubleVector> {
        validate_rhs(self.size, b.len(), 1)?;
        // x = V · Σ⁺ · Uᵀ · b
        let projected = self.u.tr_mul(b.as_dvector());
        let scaled = projected.component_mul(&self.truncated_reciprocals());
        Ok(DoubleVector::from_dvector(self.v_t.tr_mul(&scaled)))
    }

    fn solve_matrix(&self, b: &DoubleMatrix) -> SolverResult<DoubleMatrix> {
        validate_rhs(self.size, b.rows(), b.cols())?;
        let mut projected = self.u.tr_mul(b.as_dmatrix());
        let reciprocals = self.truncated_reciprocals();
        for (i, mut row) in projected.row_iter_mut().enumerate() {
            row *= reciprocals[i];
        }
        Ok(DoubleMatrix::from_dmatrix(self.v_t.tr_mul(&projected)))
    }

    fn inverse(&self) -> SolverResult<DoubleMatrix> {
        // A⁺ = V · Σ⁺ · Uᵀ
        let sigma_plus = DMatrix::from_diagonal(&self.truncated_reciprocals());
        Ok(DoubleMatrix::from_dmatrix(
            self.v_t.transpose() * sigma_plus * self.u.transpose(),
        ))
    }
}
