//! LU decomposition with partial pivoting.

use super::{validate_rhs, validate_square, Decomposition, DecompositionResult};
use crate::linalg::{DoubleMatrix, DoubleVector};
use crate::types::{SolverError, SolverResult};
use nalgebra::{Dyn, LU};

/// Partial-pivot LU factorization `P·A = L·U`.
///
/// The default choice for well-conditioned Jacobians: O(N³/3) to factorize
/// and O(N²) per solve. A matrix is rejected as singular when its smallest
/// pivot is at or below `pivot_tolerance × largest pivot`.
///
/// # Example
///
/// ```
/// use rootfinder_core::decomposition::{Decomposition, LuDecomposition};
/// use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
///
/// let a = DoubleMatrix::new(vec![vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
/// let lu = LuDecomposition::default().decompose(&a).unwrap();
///
/// let x = lu.solve(&DoubleVector::new(vec![3.0, 5.0])).unwrap();
/// assert!((x[0] - 0.8).abs() < 1e-12);
/// assert!((x[1] - 1.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LuDecomposition {
    /// Relative pivot tolerance; `None` means `N × f64::EPSILON`.
    pivot_tolerance: Option<f64>,
}

impl LuDecomposition {
    /// LU decomposition with an explicit relative pivot tolerance.
    pub fn with_pivot_tolerance(pivot_tolerance: f64) -> Self {
        Self {
            pivot_tolerance: Some(pivot_tolerance),
        }
    }

    /// Relative pivot tolerance applied to an N×N matrix.
    pub fn pivot_tolerance(&self, n: usize) -> f64 {
        self.pivot_tolerance.unwrap_or(n as f64 * f64::EPSILON)
    }
}

impl Decomposition for LuDecomposition {
    fn name(&self) -> &'static str {
        "LU"
    }

    fn decompose(&self, matrix: &DoubleMatrix) -> SolverResult<Box<dyn DecompositionResult>> {
        validate_square(matrix, self.name())?;
        let size = matrix.rows();
        let lu = matrix.as_dmatrix().clone().lu();

        let pivots = lu.u().diagonal();
        let max_pivot = pivots.iter().fold(0.0_f64, |acc, p| acc.max(p.abs()));
        if max_pivot == 0.0 {
            return Err(SolverError::singular_matrix(
                "LU decomposition: all pivots are zero",
            ));
        }
        let threshold = self.pivot_tolerance(size) * max_pivot;
        if let Some((column, pivot)) = pivots
            .iter()
            .enumerate()
            .find(|(_, p)| p.abs() <= threshold)
        {
            return Err(SolverError::singular_matrix(format!(
                "LU decomposition: pivot {:e} in column {} is below {:e}",
                pivot, column, threshold
            )));
        }

        Ok(Box::new(LuDecompositionResult { lu, size }))
    }
}

/// Factorized form produced by [`LuDecomposition`].
#[derive(Debug, Clone)]
pub struct LuDecompositionResult {
    lu: LU<f64, Dyn, Dyn>,
    size: usize,
}

impl LuDecompositionResult {
    /// Determinant of the factorized matrix.
    pub fn determinant(&self) -> f64 {
        self.lu.determinant()
    }
}

impl DecompositionResult for LuDecompositionResult {
    fn solve(&self, b: &DoubleVector) -> SolverResult<DoubleVector> {
        validate_rhs(self.size, b.len(), 1)?;
        self.lu
            .solve(b.as_dvector())
            .map(DoubleVector::from_dvector)
            .ok_or_else(|| SolverError::singular_matrix("LU solve: matrix is not invertible"))
    }

    fn solve_matrix(&self, b: &DoubleMatrix) -> SolverResult<DoubleMatrix> {
        validate_rhs(self.size, b.rows(), b.cols())?;
        self.lu
            .solve(b.as_dmatrix())
            .map(DoubleMatrix::from_dmatrix)
            .ok_or_else(|| SolverError::singular_matrix("LU solve: matrix is not invertible"))
    }

    fn inverse(&self) -> SolverResult<DoubleMatrix> {
        self.lu
            .try_inverse()
            .map(DoubleMatrix::from_dmatrix)
            .ok_or_else(|| SolverError::singular_matrix("LU inverse: matrix is not invertible"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{DenseMatrixAlgebra, MatrixAlgebra};
    use approx::assert_relative_eq;

    fn m(rows: Vec<Vec<f64>>) -> DoubleMatrix {
        DoubleMatrix::new(rows).unwrap()
    }

    #[test]
    fn test_solve_3x3() {
        let a = m(vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
        ]);
        let b = DoubleVector::new(vec![1.0, 2.0, 3.0]);

        let lu = LuDecomposition::default().decompose(&a).unwrap();
        let x = lu.solve(&b).unwrap();
        let ax = DenseMatrixAlgebra.multiply_vector(&a, &x).unwrap();
        for i in 0..3 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let a = m(vec![vec![9.0, 12.0], vec![-1.0, 16.0]]);
        let inv = LuDecomposition::default().decompose(&a).unwrap().inverse().unwrap();
        let product = DenseMatrixAlgebra.multiply(&inv, &a).unwrap();
        assert!(product.max_abs_diff(&DoubleMatrix::identity(2)) < 1e-12);
    }

    #[test]
    fn test_solve_matrix() {
        let a = m(vec![vec![2.0, 0.0], vec![0.0, 4.0]]);
        let lu = LuDecomposition::default().decompose(&a).unwrap();
        let x = lu.solve_matrix(&DoubleMatrix::identity(2)).unwrap();
        assert_eq!(x.to_rows(), vec![vec![0.5, 0.0], vec![0.0, 0.25]]);
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let zero_column = m(vec![vec![0.0, 4.0], vec![0.0, -4.0]]);
        let err = LuDecomposition::default().decompose(&zero_column).unwrap_err();
        assert!(err.is_singular_matrix());

        let rank_one = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        let err = LuDecomposition::default().decompose(&rank_one).unwrap_err();
        assert!(err.is_singular_matrix());

        let zero = DoubleMatrix::zeros(3, 3);
        assert!(LuDecomposition::default().decompose(&zero).unwrap_err().is_singular_matrix());
    }

    #[test]
    fn test_pivot_tolerance_controls_near_singular() {
        let nearly = m(vec![vec![1.0, 0.0], vec![0.0, 1e-10]]);
        assert!(LuDecomposition::default().decompose(&nearly).is_ok());
        assert!(LuDecomposition::with_pivot_tolerance(1e-8)
            .decompose(&nearly)
            .unwrap_err()
            .is_singular_matrix());
    }

    #[test]
    fn test_rhs_dimension_checked() {
        let lu = LuDecomposition::default()
            .decompose(&DoubleMatrix::identity(2))
            .unwrap();
        let err = lu.solve(&DoubleVector::zeros(3)).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_non_square_rejected() {
        let err = LuDecomposition::default()
            .decompose(&DoubleMatrix::zeros(2, 3))
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_determinant() {
        let a = m(vec![vec![9.0, 12.0], vec![-1.0, 16.0]]);
        let lu = LuDecomposition::default();
        validate_square(&a, lu.name()).unwrap();
        let result = LuDecompositionResult {
            lu: a.as_dmatrix().clone().lu(),
            size: 2,
        };
        assert_relative_eq!(result.determinant(), 156.0, epsilon = 1e-10);
    }
}
