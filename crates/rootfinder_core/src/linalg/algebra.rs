//! Shape-checked matrix algebra.
//!
//! [`MatrixAlgebra`] is the capability the root finders consume for every
//! vector and matrix operation in their inner loop. [`DenseMatrixAlgebra`]
//! is the dense implementation backed by nalgebra kernels.

use super::{DoubleMatrix, DoubleVector};
use crate::types::{SolverError, SolverResult};

/// Pure linear-algebra operations on [`DoubleVector`] and [`DoubleMatrix`].
///
/// Every operation validates operand shapes and fails with
/// `SolverError::DimensionMismatch` when they are incompatible. Inputs are
/// never mutated.
pub trait MatrixAlgebra {
    /// `a + b`
    fn add(&self, a: &DoubleMatrix, b: &DoubleMatrix) -> SolverResult<DoubleMatrix>;

    /// `a - b`
    fn subtract(&self, a: &DoubleMatrix, b: &DoubleMatrix) -> SolverResult<DoubleMatrix>;

    /// `factor * a`
    fn scale(&self, a: &DoubleMatrix, factor: f64) -> DoubleMatrix;

    /// `a + b` for vectors
    fn add_vectors(&self, a: &DoubleVector, b: &DoubleVector) -> SolverResult<DoubleVector>;

    /// `a - b` for vectors
    fn subtract_vectors(&self, a: &DoubleVector, b: &DoubleVector) -> SolverResult<DoubleVector>;

    /// `factor * v`
    fn scale_vector(&self, v: &DoubleVector, factor: f64) -> DoubleVector;

    /// Matrix-matrix product `a · b`.
    fn multiply(&self, a: &DoubleMatrix, b: &DoubleMatrix) -> SolverResult<DoubleMatrix>;

    /// Matrix-vector product `a · v`.
    fn multiply_vector(&self, a: &DoubleMatrix, v: &DoubleVector) -> SolverResult<DoubleVector>;

    /// Row-vector-matrix product `vᵀ · a`, returned as a vector.
    fn multiply_row_vector(&self, v: &DoubleVector, a: &DoubleMatrix)
        -> SolverResult<DoubleVector>;

    /// Transpose `aᵀ`.
    fn transpose(&self, a: &DoubleMatrix) -> DoubleMatrix;

    /// Outer product `a · bᵀ`.
    fn outer_product(&self, a: &DoubleVector, b: &DoubleVector) -> DoubleMatrix;

    /// Inner product `aᵀ · b`.
    fn dot(&self, a: &DoubleVector, b: &DoubleVector) -> SolverResult<f64>;

    /// Euclidean norm `‖v‖₂`.
    fn norm(&self, v: &DoubleVector) -> f64;
}

/// Dense [`MatrixAlgebra`] implementation.
///
/// Stateless and therefore safe to share between threads.
///
/// # Example
///
/// ```
/// use rootfinder_core::linalg::{DenseMatrixAlgebra, DoubleMatrix, DoubleVector, MatrixAlgebra};
///
/// let algebra = DenseMatrixAlgebra;
/// let a = DoubleMatrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// let v = DoubleVector::new(vec![1.0, 1.0]);
///
/// let av = algebra.multiply_vector(&a, &v).unwrap();
/// assert_eq!(av.to_vec(), vec![3.0, 7.0]);
///
/// let bad = DoubleVector::new(vec![1.0, 1.0, 1.0]);
/// assert!(algebra.multiply_vector(&a, &bad).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DenseMatrixAlgebra;

impl DenseMatrixAlgebra {
    fn same_shape(
        operation: &str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> SolverResult<()> {
        if left != right {
            return Err(SolverError::dimension_mismatch(operation, left, right));
        }
        Ok(())
    }
}

impl MatrixAlgebra for DenseMatrixAlgebra {
    fn add(&self, a: &DoubleMatrix, b: &DoubleMatrix) -> SolverResult<DoubleMatrix> {
        Self::same_shape("add", a.shape(), b.shape())?;
        Ok(DoubleMatrix::from_dmatrix(a.as_dmatrix() + b.as_dmatrix()))
    }

    fn subtract(&self, a: &DoubleMatrix, b: &DoubleMatrix) -> SolverResult<DoubleMatrix> {
        Self::same_shape("subtract", a.shape(), b.shape())?;
        Ok(DoubleMatrix::from_dmatrix(a.as_dmatrix() - b.as_dmatrix()))
    }

    fn scale(&self, a: &DoubleMatrix, factor: f64) -> DoubleMatrix {
        DoubleMatrix::from_dmatrix(a.as_dmatrix() * factor)
    }

    fn add_vectors(&self, a: &DoubleVector, b: &DoubleVector) -> SolverResult<DoubleVector> {
        Self::same_shape("add", a.shape(), b.shape())?;
        Ok(DoubleVector::from_dvector(a.as_dvector() + b.as_dvector()))
    }

    fn subtract_vectors(&self, a: &DoubleVector, b: &DoubleVector) -> SolverResult<DoubleVector> {
        Self::same_shape("subtract", a.shape(), b.shape())?;
        Ok(DoubleVector::from_dvector(a.as_dvector() - b.as_dvector()))
    }

    fn scale_vector(&self, v: &DoubleVector, factor: f64) -> DoubleVector {
        DoubleVector::from_dvector(v.as_dvector() * factor)
    }

    fn multiply(&self, a: &DoubleMatrix, b: &DoubleMatrix) -> SolverResult<DoubleMatrix> {
        if a.cols() != b.rows() {
            return Err(SolverError::dimension_mismatch(
                "multiply",
                a.shape(),
                b.shape(),
            ));
        }
        Ok(DoubleMatrix::from_dmatrix(a.as_dmatrix() * b.as_dmatrix()))
    }

    fn multiply_vector(&self, a: &DoubleMatrix, v: &DoubleVector) -> SolverResult<DoubleVector> {
        if a.cols() != v.len() {
            return Err(SolverError::dimension_mismatch(
                "matrix-vector multiply",
                a.shape(),
                v.shape(),
            ));
        }
        Ok(DoubleVector::from_dvector(a.as_dmatrix() * v.as_dvector()))
    }

    fn multiply_row_vector(
        &self,
        v: &DoubleVector,
        a: &DoubleMatrix,
    ) -> SolverResult<DoubleVector> {
        if a.rows() != v.len() {
            return Err(SolverError::dimension_mismatch(
                "vector-matrix multiply",
                (1, v.len()),
                a.shape(),
            ));
        }
        // (vᵀ·A)ᵀ = Aᵀ·v
        Ok(DoubleVector::from_dvector(a.as_dmatrix().tr_mul(v.as_dvector())))
    }

    fn transpose(&self, a: &DoubleMatrix) -> DoubleMatrix {
        DoubleMatrix::from_dmatrix(a.as_dmatrix().transpose())
    }

    fn outer_product(&self, a: &DoubleVector, b: &DoubleVector) -> DoubleMatrix {
        DoubleMatrix::from_dmatrix(a.as_dvector() * b.as_dvector().transpose())
    }

    fn dot(&self, a: &DoubleVector, b: &DoubleVector) -> SolverResult<f64> {
        Self::same_shape("dot", a.shape(), b.shape())?;
        Ok(a.as_dvector().dot(b.as_dvector()))
    }

    fn norm(&self, v: &DoubleVector) -> f64 {
        v.norm()
    }
}
