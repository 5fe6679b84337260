//! Step directions from the current estimate and residual.

use rootfinder_core::decomposition::Decomposition;
use rootfinder_core::linalg::{DenseMatrixAlgebra, DoubleMatrix, DoubleVector, MatrixAlgebra};
use rootfinder_core::types::SolverResult;
use std::fmt;
use std::sync::Arc;

/// Computes the Newton step `Δx` for residual `y`.
pub trait DirectionFunction: fmt::Debug + Send + Sync {
    /// Step from `estimate` and the residual `y = f(x)`.
    fn direction(&self, estimate: &DoubleMatrix, y: &DoubleVector) -> SolverResult<DoubleVector>;
}

/// `Δx = −M·y` for an inverse-Jacobian estimate `M`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseJacobianDirection {
    algebra: DenseMatrixAlgebra,
}

impl DirectionFunction for InverseJacobianDirection {
    fn direction(&self, estimate: &DoubleMatrix, y: &DoubleVector) -> SolverResult<DoubleVector> {
        let m_y = self.algebra.multiply_vector(estimate, y)?;
        Ok(self.algebra.scale_vector(&m_y, -1.0))
    }
}

/// Solves `J·Δx = −y` for a Jacobian estimate `J`.
///
/// The estimate is factorized on every call.
#[derive(Debug, Clone)]
pub struct JacobianDirection {
    decomposition: Arc<dyn Decomposition>,
    algebra: DenseMatrixAlgebra,
}

impl JacobianDirection {
    /// Direction solving through `decomposition`.
    pub fn new(decomposition: Arc<dyn Decomposition>) -> Self {
        Self {
            decomposition,
            algebra: DenseMatrixAlgebra,
        }
    }
}

impl DirectionFunction for JacobianDirection {
    fn direction(&self, estimate: &DoubleMatrix, y: &DoubleVector) -> SolverResult<DoubleVector> {
        let rhs = self.algebra.scale_vector(y, -1.0);
        self.decomposition.decompose(estimate)?.solve(&rhs)
    }
}
