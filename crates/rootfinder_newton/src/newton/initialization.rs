//! Initial Jacobian estimates.

use rootfinder_core::decomposition::Decomposition;
use rootfinder_core::function::JacobianFunction;
use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
use rootfinder_core::types::{SolverError, SolverResult};
use std::fmt;
use std::sync::Arc;

/// Produces the estimate the iteration starts from.
pub trait EstimateInitialization: fmt::Debug + Send + Sync {
    /// Build the estimate at the starting point `x`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `x` or `J(x)` is empty
    /// - `DimensionMismatch` if `J(x)` is not `N×N`
    /// - whatever the decomposition raises, typically `SingularMatrix`
    fn initialize(&self, jacobian: &dyn JacobianFunction, x: &DoubleVector)
        -> SolverResult<DoubleMatrix>;
}

/// Evaluate `J(x)` and check it is a non-empty `N×N` matrix.
pub(crate) fn evaluate_jacobian(
    jacobian: &dyn JacobianFunction,
    x: &DoubleVector,
) -> SolverResult<DoubleMatrix> {
    if x.is_empty() {
        return Err(SolverError::invalid_argument(
            "Jacobian requested at an empty point",
        ));
    }
    let matrix = jacobian.jacobian(x);
    if matrix.is_empty() {
        return Err(SolverError::invalid_argument(
            "Jacobian function returned an empty matrix",
        ));
    }
    let n = x.len();
    if matrix.shape() != (n, n) {
        return Err(SolverError::dimension_mismatch(
            "Jacobian evaluation",
            matrix.shape(),
            (n, n),
        ));
    }
    Ok(matrix)
}

/// Starts from the (pseudo-)inverse of `J(x0)`.
///
/// # Example
///
/// ```
/// use rootfinder_core::decomposition::LuDecomposition;
/// use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
/// use rootfinder_newton::newton::{EstimateInitialization, InverseJacobianInitialization};
/// use std::sync::Arc;
///
/// let jacobian = |_: &DoubleVector| {
///     DoubleMatrix::new(vec![vec![2.0, 0.0], vec![0.0, 4.0]]).unwrap()
/// };
/// let init = InverseJacobianInitialization::new(Arc::new(LuDecomposition::default()));
/// let m0 = init.initialize(&jacobian, &DoubleVector::zeros(2)).unwrap();
/// assert_eq!(m0.to_rows(), vec![vec![0.5, 0.0], vec![0.0, 0.25]]);
/// ```
#[derive(Debug, Clone)]
pub struct InverseJacobianInitialization {
    decomposition: Arc<dyn Decomposition>,
}

impl InverseJacobianInitialization {
    /// Initialization inverting through `decomposition`.
    pub fn new(decomposition: Arc<dyn Decomposition>) -> Self {
        Self { decomposition }
    }

    /// Like [`new`](Self::new) but rejects an absent decomposition.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `decomposition` is `None`.
    pub fn try_new(decomposition: Option<Arc<dyn Decomposition>>) -> SolverResult<Self> {
        decomposition.map(Self::new).ok_or_else(|| {
            SolverError::invalid_argument("inverse Jacobian initialization needs a decomposition")
        })
    }

    /// Decomposition used for the inversion.
    pub fn decomposition(&self) -> &dyn Decomposition {
        self.decomposition.as_ref()
    }
}

impl EstimateInitialization for InverseJacobianInitialization {
    fn initialize(
        &self,
        jacobian: &dyn JacobianFunction,
        x: &DoubleVector,
    ) -> SolverResult<DoubleMatrix> {
        let j = evaluate_jacobian(jacobian, x)?;
        self.decomposition.decompose(&j)?.inverse()
    }
}

/// Starts from `J(x0)` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct JacobianInitialization;

impl EstimateInitialization for JacobianInitialization {
    fn initialize(
        &self,
        jacobian: &dyn JacobianFunction,
        x: &DoubleVector,
    ) -> SolverResult<DoubleMatrix> {
        evaluate_jacobian(jacobian, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootfinder_core::decomposition::{LuDecomposition, SvdDecomposition};
    use rootfinder_core::linalg::{DenseMatrixAlgebra, MatrixAlgebra};

    fn jacobian(x: &DoubleVector) -> DoubleMatrix {
        DoubleMatrix::new(vec![
            vec![x[0] * x[0], x[0] * x[1]],
            vec![x[0] - x[1], x[1] * x[1]],
        ])
        .unwrap()
    }

    fn assert_inverts(decomposition: Arc<dyn Decomposition>) {
        let x0 = DoubleVector::new(vec![3.0, 4.0]);
        let m0 = InverseJacobianInitialization::new(decomposition)
            .initialize(&jacobian, &x0)
            .unwrap();
        let product = DenseMatrixAlgebra.multiply(&m0, &jacobian(&x0)).unwrap();
        assert!(product.max_abs_diff(&DoubleMatrix::identity(2)) < 1e-6);
    }

    #[test]
    fn test_inverse_initialization_lu() {
        assert_inverts(Arc::new(LuDecomposition::default()));
    }

    #[test]
    fn test_inverse_initialization_svd() {
        assert_inverts(Arc::new(SvdDecomposition::default()));
    }

    #[test]
    fn test_try_new_without_decomposition() {
        let err = InverseJacobianInitialization::try_new(None).unwrap_err();
        assert!(err.is_invalid_argument());

        let ok = InverseJacobianInitialization::try_new(Some(Arc::new(LuDecomposition::default())));
        assert_eq!(ok.unwrap().decomposition().name(), "LU");
    }

    #[test]
    fn test_empty_point_rejected() {
        let init = InverseJacobianInitialization::new(Arc::new(LuDecomposition::default()));
        let err = init.initialize(&jacobian, &DoubleVector::new(vec![])).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_empty_jacobian_rejected() {
        let empty = |_: &DoubleVector| DoubleMatrix::zeros(0, 0);
        let err = JacobianInitialization
            .initialize(&empty, &DoubleVector::zeros(2))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let wide = |_: &DoubleVector| DoubleMatrix::zeros(2, 3);
        let err = JacobianInitialization
            .initialize(&wide, &DoubleVector::zeros(2))
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_singular_jacobian_with_lu() {
        let singular = |_: &DoubleVector| {
            DoubleMatrix::new(vec![vec![0.0, 4.0], vec![0.0, -4.0]]).unwrap()
        };
        let init = InverseJacobianInitialization::new(Arc::new(LuDecomposition::default()));
        let err = init.initialize(&singular, &DoubleVector::zeros(2)).unwrap_err();
        assert!(err.is_singular_matrix());
    }

    #[test]
    fn test_jacobian_initialization_returns_jacobian() {
        let x0 = DoubleVector::new(vec![3.0, 4.0]);
        let j0 = JacobianInitialization.initialize(&jacobian, &x0).unwrap();
        assert_eq!(j0.to_rows(), vec![vec![9.0, 12.0], vec![-1.0, 16.0]]);
    }
}
