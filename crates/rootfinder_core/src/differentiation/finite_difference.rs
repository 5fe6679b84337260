//! Finite-difference Jacobians of vector fields.

use crate::function::{JacobianFunction, VectorFunction};
use crate::linalg::{DoubleMatrix, DoubleVector};

/// Difference scheme used to approximate each Jacobian column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FiniteDifferenceType {
    /// `(f(x + h) - f(x)) / h`, one extra evaluation per column (default).
    #[default]
    Forward,
    /// `(f(x + h) - f(x - h)) / 2h`, two evaluations per column, O(h²) error.
    Central,
    /// `(f(x) - f(x - h)) / h`, one extra evaluation per column.
    Backward,
}

impl FiniteDifferenceType {
    /// Default relative step for this scheme: √ε for one-sided, ∛ε for central.
    pub fn default_step_scale(self) -> f64 {
        match self {
            FiniteDifferenceType::Forward | FiniteDifferenceType::Backward => f64::EPSILON.sqrt(),
            FiniteDifferenceType::Central => f64::EPSILON.cbrt(),
        }
    }
}

/// Builds finite-difference Jacobians for [`VectorFunction`]s.
///
/// The step for coordinate `i` is `step_scale × max(1, |x_i|)`.
///
/// # Example
///
/// ```
/// use rootfinder_core::differentiation::VectorFieldDifferentiator;
/// use rootfinder_core::function::JacobianFunction;
/// use rootfinder_core::linalg::DoubleVector;
///
/// let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[1], x[0] + x[1]]);
/// let differentiator = VectorFieldDifferentiator::default();
/// let jacobian = differentiator.differentiate(&f);
///
/// let j = jacobian.jacobian(&DoubleVector::new(vec![2.0, 3.0]));
/// assert!((j[(0, 0)] - 3.0).abs() < 1e-6);
/// assert!((j[(0, 1)] - 2.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VectorFieldDifferentiator {
    scheme: FiniteDifferenceType,
    step_scale: Option<f64>,
}

impl VectorFieldDifferentiator {
    /// Differentiator with the scheme's default step.
    pub fn new(scheme: FiniteDifferenceType) -> Self {
        Self {
            scheme,
            step_scale: None,
        }
    }

    /// Differentiator with an explicit relative step.
    pub fn with_step_scale(scheme: FiniteDifferenceType, step_scale: f64) -> Self {
        Self {
            scheme,
            step_scale: Some(step_scale),
        }
    }

    /// Difference scheme in use.
    pub fn scheme(&self) -> FiniteDifferenceType {
        self.scheme
    }

    /// Relative step in use.
    pub fn step_scale(&self) -> f64 {
        self.step_scale.unwrap_or_else(|| self.scheme.default_step_scale())
    }

    /// Wrap `function` as a [`JacobianFunction`].
    pub fn differentiate<'a, F>(&self, function: &'a F) -> FiniteDifferenceJacobian<'a, F>
    where
        F: VectorFunction + ?Sized,
    {
        FiniteDifferenceJacobian {
            function,
            differentiator: *self,
        }
    }

    /// Approximate the Jacobian of `function` at `x`.
    ///
    /// Entries are NaN where perturbed evaluations return fewer components
    /// than `function(x)`; decompositions reject such matrices.
    pub fn jacobian_at<F>(&self, function: &F, x: &DoubleVector) -> DoubleMatrix
    where
        F: VectorFunction + ?Sized,
    {
        let n = x.len();
        let scale = self.step_scale();
        let y0 = match self.scheme {
            FiniteDifferenceType::Central => None,
            _ => Some(function.evaluate(x)),
        };

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(n);
        for j in 0..n {
            let h = scale * x[j].abs().max(1.0);
            let column = match self.scheme {
                FiniteDifferenceType::Forward => {
                    let (x_up, h_up) = perturb(x, j, h);
                    difference(&function.evaluate(&x_up), y0.as_ref(), h_up)
                }
                FiniteDifferenceType::Backward => {
                    let (x_down, h_down) = perturb(x, j, -h);
                    // (f(x) - f(x - h)) / h == (f(x - h) - f(x)) / (-h)
                    difference(&function.evaluate(&x_down), y0.as_ref(), h_down)
                }
                FiniteDifferenceType::Central => {
                    let (x_up, h_up) = perturb(x, j, h);
                    let (x_down, h_down) = perturb(x, j, -h);
                    let y_down = function.evaluate(&x_down);
                    difference(&function.evaluate(&x_up), Some(&y_down), h_up - h_down)
                }
            };
            columns.push(column);
        }

        let m = columns
            .first()
            .map_or_else(|| y0.as_ref().map_or(0, DoubleVector::len), Vec::len);
        DoubleMatrix::from_fn(m, n, |i, j| columns[j].get(i).copied().unwrap_or(f64::NAN))
    }
}

/// Copy of `x` with `x[index] += step`, and the step actually representable.
fn perturb(x: &DoubleVector, index: usize, step: f64) -> (DoubleVector, f64) {
    let mut shifted = x.to_vec();
    shifted[index] += step;
    let actual = shifted[index] - x[index];
    (DoubleVector::new(shifted), actual)
}

/// `(y1 - y0) / h` component-wise; NaN where the lengths disagree.
fn difference(y1: &DoubleVector, y0: Option<&DoubleVector>, h: f64) -> Vec<f64> {
    match y0 {
        Some(y0) => (0..y0.len())
            .map(|i| y1.get(i).map_or(f64::NAN, |v| (v - y0[i]) / h))
            .collect(),
        None => vec![f64::NAN; y1.len()],
    }
}

/// Finite-difference [`JacobianFunction`] bound to a vector field.
///
/// Created by [`VectorFieldDifferentiator::differentiate`].
#[derive(Debug)]
pub struct FiniteDifferenceJacobian<'a, F: ?Sized> {
    function: &'a F,
    differentiator: VectorFieldDifferentiator,
}

impl<F: VectorFunction + ?Sized> JacobianFunction for FiniteDifferenceJacobian<'_, F> {
    fn jacobian(&self, x: &DoubleVector) -> DoubleMatrix {
        self.differentiator.jacobian_at(self.function, x)
    }
}
