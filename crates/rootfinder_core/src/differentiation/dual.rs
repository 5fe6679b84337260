//! Exact Jacobians by forward-mode dual numbers.

use crate::function::{JacobianFunction, VectorFunction};
use crate::linalg::{DoubleMatrix, DoubleVector};
use num_dual::Dual64;

/// Jacobian of a vector field written over [`Dual64`].
///
/// Each column is one forward pass with the matching coordinate seeded with
/// a unit derivative, so the result is exact to machine precision at the
/// cost of N function evaluations.
///
/// # Example
///
/// ```
/// use num_dual::Dual64;
/// use rootfinder_core::differentiation::DualJacobian;
/// use rootfinder_core::function::{JacobianFunction, VectorFunction};
/// use rootfinder_core::linalg::DoubleVector;
///
/// let field = DualJacobian::new(|x: &[Dual64]| vec![x[0] * x[1], x[0] * x[0]]);
/// let point = DoubleVector::new(vec![2.0, 3.0]);
///
/// let j = field.jacobian(&point);
/// assert_eq!(j.to_rows(), vec![vec![3.0, 2.0], vec![4.0, 0.0]]);
/// assert_eq!(field.value_function().evaluate(&point).to_vec(), vec![6.0, 4.0]);
/// ```
#[derive(Debug, Clone)]
pub struct DualJacobian<F> {
    function: F,
}

impl<F> DualJacobian<F>
where
    F: Fn(&[Dual64]) -> Vec<Dual64>,
{
    /// Wrap a dual-number vector field.
    pub fn new(function: F) -> Self {
        Self { function }
    }

    /// The field's plain values as a [`VectorFunction`].
    pub fn value_function(&self) -> DualValueFunction<'_, F> {
        DualValueFunction { function: &self.function }
    }

    fn seeded(x: &DoubleVector, seed: Option<usize>) -> Vec<Dual64> {
        x.iter()
            .enumerate()
            .map(|(i, &v)| Dual64::new(v, if Some(i) == seed { 1.0 } else { 0.0 }))
            .collect()
    }
}

impl<F> JacobianFunction for DualJacobian<F>
where
    F: Fn(&[Dual64]) -> Vec<Dual64>,
{
    fn jacobian(&self, x: &DoubleVector) -> DoubleMatrix {
        let n = x.len();
        let columns: Vec<Vec<f64>> = (0..n)
            .map(|j| {
                (self.function)(&Self::seeded(x, Some(j)))
                    .iter()
                    .map(|d| d.eps)
                    .collect()
            })
            .collect();
        let m = columns.first().map_or(0, Vec::len);
        DoubleMatrix::from_fn(m, n, |i, j| columns[j].get(i).copied().unwrap_or(f64::NAN))
    }
}

/// Value-only view of a [`DualJacobian`]'s field.
#[derive(Debug)]
pub struct DualValueFunction<'a, F> {
    function: &'a F,
}

impl<F> VectorFunction for DualValueFunction<'_, F>
where
    F: Fn(&[Dual64]) -> Vec<Dual64>,
{
    fn evaluate(&self, x: &DoubleVector) -> DoubleVector {
        let values = (self.function)(&DualJacobian::<F>::seeded(x, None));
        DoubleVector::new(values.iter().map(|d| d.re).collect())
    }
}
