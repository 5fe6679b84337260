//! Error types for vector root finding.
//!
//! This module provides:
//! - `SolverError`: every failure raised by algebra, decompositions,
//!   estimate maintenance and the iteration driver
//! - `SolverResult`: `Result` alias carrying a `SolverError`

use thiserror::Error;

/// Result alias used throughout the root-finding crates.
pub type SolverResult<T> = Result<T, SolverError>;

/// Vector root-finding errors.
///
/// All four kinds are unrecoverable for the solve that raised them and are
/// propagated to the caller unchanged.
///
/// # Variants
/// - `InvalidArgument`: a required input is absent (empty) or malformed
/// - `DimensionMismatch`: operand shapes are incompatible
/// - `SingularMatrix`: the configured decomposition cannot invert a matrix
/// - `ConvergenceFailure`: the step budget ran out before the tolerance was met
///
/// # Examples
/// ```
/// use rootfinder_core::types::SolverError;
///
/// let err = SolverError::ConvergenceFailure { iterations: 100, residual: 0.5 };
/// assert!(format!("{}", err).contains("100 steps"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// A required input is absent or otherwise malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operand shapes are incompatible with the requested operation.
    #[error("Dimension mismatch in {operation}: {left:?} vs {right:?}")]
    DimensionMismatch {
        /// Name of the operation that rejected the operands
        operation: String,
        /// Shape (rows, cols) of the left operand
        left: (usize, usize),
        /// Shape (rows, cols) of the right operand
        right: (usize, usize),
    },

    /// Matrix cannot be inverted or solved by the configured decomposition.
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// Iteration exhausted its step budget without meeting the tolerance.
    #[error("Failed to converge after {iterations} steps (residual norm = {residual})")]
    ConvergenceFailure {
        /// Number of steps attempted
        iterations: usize,
        /// Euclidean norm of the last residual
        residual: f64,
    },
}

impl SolverError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            operation: operation.into(),
            left,
            right,
        }
    }

    /// Create a singular matrix error.
    pub fn singular_matrix(message: impl Into<String>) -> Self {
        Self::SingularMatrix(message.into())
    }

    /// Create a convergence failure error.
    pub fn convergence_failure(iterations: usize, residual: f64) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
        }
    }

    /// Check if this is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a dimension mismatch error.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }

    /// Check if this is a singular matrix error.
    pub fn is_singular_matrix(&self) -> bool {
        matches!(self, Self::SingularMatrix(_))
    }

    /// Check if this is a convergence failure.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, Self::ConvergenceFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = SolverError::invalid_argument("deltaX was empty");
        assert_eq!(format!("{}", err), "Invalid argument: deltaX was empty");
        assert!(err.is_invalid_argument());
        assert!(!err.is_singular_matrix());
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = SolverError::dimension_mismatch("multiply", (2, 3), (2, 3));
        assert_eq!(
            format!("{}", err),
            "Dimension mismatch in multiply: (2, 3) vs (2, 3)"
        );
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_singular_matrix_display() {
        let err = SolverError::singular_matrix("zero pivot in column 0");
        assert_eq!(format!("{}", err), "Singular matrix: zero pivot in column 0");
        assert!(err.is_singular_matrix());
    }

    #[test]
    fn test_convergence_failure_display() {
        let err = SolverError::convergence_failure(50, 0.25);
        let display = format!("{}", err);
        assert!(display.contains("50 steps"));
        assert!(display.contains("0.25"));
        assert!(err.is_convergence_failure());
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = SolverError::invalid_argument("Test");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_clone_and_equality() {
        let err1 = SolverError::singular_matrix("Test");
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
