//! Vector and matrix primitives with shape-checked algebra.
//!
//! This module provides:
//! - [`DoubleVector`]: immutable dense vector
//! - [`DoubleMatrix`]: immutable dense matrix
//! - [`MatrixAlgebra`]: add, subtract, scale, multiply, transpose, norm
//! - [`DenseMatrixAlgebra`]: the nalgebra-backed implementation
//!
//! Shape violations surface as `SolverError::DimensionMismatch` rather than
//! panics, so the solvers can propagate them to the caller.

mod algebra;
mod matrix;
mod vector;

pub use algebra::{DenseMatrixAlgebra, MatrixAlgebra};
pub use matrix::DoubleMatrix;
pub use vector::DoubleVector;
