//! Integration tests for module exports.
//!
//! Verify that the public modules and types are reachable via absolute
//! paths and interoperate across module boundaries.

use std::sync::Arc;

/// Linear algebra types and the algebra trait are exported.
#[test]
fn test_linalg_module_exports() {
    use rootfinder_core::linalg::{DenseMatrixAlgebra, DoubleMatrix, DoubleVector, MatrixAlgebra};

    let a = DoubleMatrix::identity(2);
    let v = DoubleVector::new(vec![1.0, 2.0]);
    let av = DenseMatrixAlgebra.multiply_vector(&a, &v).unwrap();
    assert_eq!(av.to_vec(), vec![1.0, 2.0]);
}

/// Decompositions are usable through the shared trait object.
#[test]
fn test_decomposition_module_exports() {
    use rootfinder_core::decomposition::{
        Decomposition, DecompositionMethod, LuDecomposition, SvdDecomposition,
    };
    use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};

    let a = DoubleMatrix::new(vec![vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    let b = DoubleVector::new(vec![3.0, 5.0]);

    let strategies: Vec<Arc<dyn Decomposition>> = vec![
        Arc::new(LuDecomposition::default()),
        Arc::new(SvdDecomposition::default()),
        DecompositionMethod::Lu.build(),
        DecompositionMethod::Svd.build(),
    ];
    for strategy in strategies {
        let x = strategy.decompose(&a).unwrap().solve(&b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12, "{}", strategy.name());
        assert!((x[1] - 1.4).abs() < 1e-12, "{}", strategy.name());
    }
}

/// Error type and result alias are exported.
#[test]
fn test_types_module_exports() {
    use rootfinder_core::types::{SolverError, SolverResult};

    fn fails() -> SolverResult<()> {
        Err(SolverError::singular_matrix("test"))
    }
    assert!(fails().unwrap_err().is_singular_matrix());
}

/// Finite-difference Jacobians accept closures through the function traits.
#[test]
fn test_differentiation_module_exports() {
    use rootfinder_core::differentiation::{FiniteDifferenceType, VectorFieldDifferentiator};
    use rootfinder_core::function::JacobianFunction;
    use rootfinder_core::linalg::DoubleVector;

    let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[0], x[0] + 2.0 * x[1]]);
    let differentiator = VectorFieldDifferentiator::new(FiniteDifferenceType::Central);
    let j = differentiator
        .differentiate(&f)
        .jacobian(&DoubleVector::new(vec![1.5, 0.0]));

    assert!((j[(0, 0)] - 3.0).abs() < 1e-8);
    assert!((j[(1, 1)] - 2.0).abs() < 1e-8);
}

/// Dual-number Jacobians are exported when the feature is enabled.
#[cfg(feature = "num-dual-mode")]
#[test]
fn test_dual_jacobian_export() {
    use num_dual::{Dual64, DualNum};
    use rootfinder_core::differentiation::DualJacobian;
    use rootfinder_core::function::JacobianFunction;
    use rootfinder_core::linalg::DoubleVector;

    let field = DualJacobian::new(|x: &[Dual64]| vec![x[0].sin(), x[0] * x[1]]);
    let j = field.jacobian(&DoubleVector::new(vec![0.0, 4.0]));

    assert!((j[(0, 0)] - 1.0).abs() < 1e-15);
    assert_eq!(j[(0, 1)], 0.0);
    assert_eq!(j[(1, 0)], 4.0);
    assert_eq!(j[(1, 1)], 0.0);
}
