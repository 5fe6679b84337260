//! Estimate maintenance between iterations.
//!
//! Full-recompute strategies re-evaluate the Jacobian at the new point;
//! Broyden strategies apply a rank-one secant correction instead and never
//! call the Jacobian function after initialization.

use super::initialization::evaluate_jacobian;
use rootfinder_core::decomposition::Decomposition;
use rootfinder_core::function::JacobianFunction;
use rootfinder_core::linalg::{DenseMatrixAlgebra, DoubleMatrix, DoubleVector, MatrixAlgebra};
use rootfinder_core::types::{SolverError, SolverResult};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Default relative threshold below which a Broyden denominator counts as zero.
pub const DEFAULT_DENOMINATOR_TOLERANCE: f64 = 1e-12;

/// Refreshes the estimate after a step.
pub trait MatrixUpdateFunction: fmt::Debug + Send + Sync {
    /// New estimate at `x` after the step `delta_x` changed the residual by
    /// `delta_y`.
    ///
    /// # Errors
    ///
    /// Strategies that need `delta_x`, `delta_y` or `estimate` fail with
    /// `InvalidArgument` when any of them is absent or empty.
    fn update(
        &self,
        jacobian: &dyn JacobianFunction,
        x: &DoubleVector,
        delta_x: Option<&DoubleVector>,
        delta_y: Option<&DoubleVector>,
        estimate: Option<&DoubleMatrix>,
    ) -> SolverResult<DoubleMatrix>;
}

fn require_vector<'a>(
    value: Option<&'a DoubleVector>,
    name: &str,
) -> SolverResult<&'a DoubleVector> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SolverError::invalid_argument(format!("{} is required", name))),
    }
}

fn require_matrix<'a>(
    value: Option<&'a DoubleMatrix>,
    name: &str,
) -> SolverResult<&'a DoubleMatrix> {
    match value {
        Some(m) if !m.is_empty() => Ok(m),
        _ => Err(SolverError::invalid_argument(format!("{} is required", name))),
    }
}

/// Recomputes `J(x)` and inverts it.
#[derive(Debug, Clone)]
pub struct NewtonInverseUpdate {
    decomposition: Arc<dyn Decomposition>,
}

impl NewtonInverseUpdate {
    /// Update inverting through `decomposition`.
    pub fn new(decomposition: Arc<dyn Decomposition>) -> Self {
        Self { decomposition }
    }
}

impl MatrixUpdateFunction for NewtonInverseUpdate {
    fn update(
        &self,
        jacobian: &dyn JacobianFunction,
        x: &DoubleVector,
        _delta_x: Option<&DoubleVector>,
        _delta_y: Option<&DoubleVector>,
        _estimate: Option<&DoubleMatrix>,
    ) -> SolverResult<DoubleMatrix> {
        let j = evaluate_jacobian(jacobian, x)?;
        self.decomposition.decompose(&j)?.inverse()
    }
}

/// Recomputes `J(x)` without inverting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonJacobianUpdate;

impl MatrixUpdateFunction for NewtonJacobianUpdate {
    fn update(
        &self,
        jacobian: &dyn JacobianFunction,
        x: &DoubleVector,
        _delta_x: Option<&DoubleVector>,
        _delta_y: Option<&DoubleVector>,
        _estimate: Option<&DoubleMatrix>,
    ) -> SolverResult<DoubleMatrix> {
        evaluate_jacobian(jacobian, x)
    }
}

/// Good Broyden update of an inverse-Jacobian estimate.
///
/// ```text
/// M+ = M + ((Δx − M·Δy) · Δxᵀ·M) / (Δxᵀ·M·Δy)
/// ```
///
/// The updated estimate satisfies the secant condition `M+·Δy = Δx`. When
/// `|Δxᵀ·M·Δy| ≤ tol · ‖Δx‖ · ‖M·Δy‖` or the result is not finite, the
/// estimate is returned unchanged and a warning is logged.
///
/// # Example
///
/// ```
/// use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
/// use rootfinder_newton::newton::{BroydenInverseUpdate, MatrixUpdateFunction};
///
/// let unused = |_: &DoubleVector| DoubleMatrix::identity(2);
/// let dx = DoubleVector::new(vec![1.0, 0.0]);
/// let dy = DoubleVector::new(vec![2.0, 0.0]);
/// let m = DoubleMatrix::identity(2);
///
/// let updated = BroydenInverseUpdate::default()
///     .update(&unused, &dx, Some(&dx), Some(&dy), Some(&m))
///     .unwrap();
/// assert_eq!(updated.to_rows(), vec![vec![0.5, 0.0], vec![0.0, 1.0]]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BroydenInverseUpdate {
    denominator_tolerance: f64,
    algebra: DenseMatrixAlgebra,
}

impl Default for BroydenInverseUpdate {
    fn default() -> Self {
        Self {
            denominator_tolerance: DEFAULT_DENOMINATOR_TOLERANCE,
            algebra: DenseMatrixAlgebra,
        }
    }
}

impl BroydenInverseUpdate {
    /// Update with an explicit relative denominator tolerance.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless the tolerance is finite and non-negative.
    pub fn with_denominator_tolerance(denominator_tolerance: f64) -> SolverResult<Self> {
        if !denominator_tolerance.is_finite() || denominator_tolerance < 0.0 {
            return Err(SolverError::invalid_argument(format!(
                "denominator_tolerance must be finite and non-negative, got {}",
                denominator_tolerance
            )));
        }
        Ok(Self {
            denominator_tolerance,
            algebra: DenseMatrixAlgebra,
        })
    }

    /// Relative denominator tolerance.
    pub fn denominator_tolerance(&self) -> f64 {
        self.denominator_tolerance
    }
}

impl MatrixUpdateFunction for BroydenInverseUpdate {
    fn update(
        &self,
        _jacobian: &dyn JacobianFunction,
        _x: &DoubleVector,
        delta_x: Option<&DoubleVector>,
        delta_y: Option<&DoubleVector>,
        estimate: Option<&DoubleMatrix>,
    ) -> SolverResult<DoubleMatrix> {
        let dx = require_vector(delta_x, "delta_x")?;
        let dy = require_vector(delta_y, "delta_y")?;
        let m = require_matrix(estimate, "estimate")?;
        let algebra = &self.algebra;

        let m_dy = algebra.multiply_vector(m, dy)?;
        let dx_t_m = algebra.multiply_row_vector(dx, m)?;
        let denominator = algebra.dot(dx, &m_dy)?;
        let threshold = self.denominator_tolerance * algebra.norm(dx) * algebra.norm(&m_dy);
        if !denominator.is_finite() || denominator.abs() <= threshold {
            warn!(
                denominator,
                threshold, "Broyden inverse update skipped: degenerate denominator"
            );
            return Ok(m.clone());
        }

        let correction = algebra.outer_product(&algebra.subtract_vectors(dx, &m_dy)?, &dx_t_m);
        let updated = algebra.add(m, &algebra.scale(&correction, 1.0 / denominator))?;
        if !updated.is_finite() {
            warn!("Broyden inverse update skipped: non-finite estimate");
            return Ok(m.clone());
        }
        Ok(updated)
    }
}

/// Good Broyden update of a Jacobian estimate.
///
/// ```text
/// J+ = J + ((Δy − J·Δx) · Δxᵀ) / (Δxᵀ·Δx)
/// ```
///
/// The updated estimate satisfies `J+·Δx = Δy`. A zero step leaves the
/// estimate unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BroydenJacobianUpdate {
    algebra: DenseMatrixAlgebra,
}

impl MatrixUpdateFunction for BroydenJacobianUpdate {
    fn update(
        &self,
        _jacobian: &dyn JacobianFunction,
        _x: &DoubleVector,
        delta_x: Option<&DoubleVector>,
        delta_y: Option<&DoubleVector>,
        estimate: Option<&DoubleMatrix>,
    ) -> SolverResult<DoubleMatrix> {
        let dx = require_vector(delta_x, "delta_x")?;
        let dy = require_vector(delta_y, "delta_y")?;
        let j = require_matrix(estimate, "estimate")?;
        let algebra = &self.algebra;

        let j_dx = algebra.multiply_vector(j, dx)?;
        let denominator = algebra.dot(dx, dx)?;
        if denominator == 0.0 || !denominator.is_finite() {
            warn!(denominator, "Broyden Jacobian update skipped: degenerate step");
            return Ok(j.clone());
        }

        let correction = algebra.outer_product(&algebra.subtract_vectors(dy, &j_dx)?, dx);
        let updated = algebra.add(j, &algebra.scale(&correction, 1.0 / denominator))?;
        if !updated.is_finite() {
            warn!("Broyden Jacobian update skipped: non-finite estimate");
            return Ok(j.clone());
        }
        Ok(updated)
    }
}
