//! Function traits for vector fields and their Jacobians.
//!
//! Both traits are blanket-implemented for closures, so a plain
//! `|x: &DoubleVector| -> DoubleVector` can be handed to any solver.
//!
//! ```
//! use rootfinder_core::function::{JacobianFunction, VectorFunction};
//! use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
//!
//! let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[0] - 2.0]);
//! let j = |x: &DoubleVector| DoubleMatrix::from_fn(1, 1, |_, _| 2.0 * x[0]);
//!
//! let x = DoubleVector::new(vec![1.0]);
//! assert_eq!(f.evaluate(&x)[0], -1.0);
//! assert_eq!(j.jacobian(&x)[(0, 0)], 2.0);
//! ```

use crate::linalg::{DoubleMatrix, DoubleVector};

/// Pure mapping Rᴺ → Rᴺ.
///
/// Implementations must be deterministic; the convergence guarantees of
/// the solvers rely on repeated evaluations at the same point agreeing.
pub trait VectorFunction {
    /// Evaluate the function at `x`.
    fn evaluate(&self, x: &DoubleVector) -> DoubleVector;
}

/// Pure mapping Rᴺ → Rᴺˣᴺ returning the Jacobian matrix at a point.
pub trait JacobianFunction {
    /// Evaluate the Jacobian at `x`.
    fn jacobian(&self, x: &DoubleVector) -> DoubleMatrix;
}

impl<F> VectorFunction for F
where
    F: Fn(&DoubleVector) -> DoubleVector,
{
    #[inline]
    fn evaluate(&self, x: &DoubleVector) -> DoubleVector {
        self(x)
    }
}

impl<F> JacobianFunction for F
where
    F: Fn(&DoubleVector) -> DoubleMatrix,
{
    #[inline]
    fn jacobian(&self, x: &DoubleVector) -> DoubleMatrix {
        self(x)
    }
}
