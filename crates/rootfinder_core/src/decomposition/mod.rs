//! Matrix factorizations for linear solves and (pseudo-)inversion.
//!
//! A [`Decomposition`] is a factorization strategy: given a square matrix it
//! produces a [`DecompositionResult`] able to solve `A·x = b` and to form
//! an explicit (pseudo-)inverse.
//!
//! ## Available Decompositions
//!
//! - [`LuDecomposition`]: fast partial-pivot LU; fails with
//!   `SolverError::SingularMatrix` on (numerically) singular input
//! - [`SvdDecomposition`]: singular value decomposition; singular values
//!   below a relative tolerance are dropped from the pseudo-inverse, so it
//!   never fails on exact singularity
//!
//! There is no automatic fallback from LU to SVD. Callers that expect rank
//! deficient Jacobians choose [`SvdDecomposition`] up front.
//!
//! ## Example
//!
//! ```
//! use rootfinder_core::decomposition::{Decomposition, LuDecomposition, SvdDecomposition};
//! use rootfinder_core::linalg::DoubleMatrix;
//!
//! let singular = DoubleMatrix::new(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
//!
//! assert!(LuDecomposition::default().decompose(&singular).is_err());
//! let svd = SvdDecomposition::default().decompose(&singular).unwrap();
//! let pinv = svd.inverse().unwrap();
//! assert_eq!(pinv.shape(), (2, 2));
//! ```

mod lu;
mod svd;

pub use lu::{LuDecomposition, LuDecompositionResult};
pub use svd::{SvdDecomposition, SvdDecompositionResult};

use crate::linalg::{DoubleMatrix, DoubleVector};
use crate::types::{SolverError, SolverResult};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Factorization strategy for square matrices.
///
/// Implementations are stateless apart from their configuration, so a
/// single instance can be shared between threads and solver components.
pub trait Decomposition: fmt::Debug + Send + Sync {
    /// Short name of the factorization, e.g. `"LU"`.
    fn name(&self) -> &'static str;

    /// Factorize `matrix`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the matrix is empty or has non-finite entries
    /// - `DimensionMismatch` if the matrix is not square
    /// - `SingularMatrix` if the factorization cannot represent an inverse
    fn decompose(&self, matrix: &DoubleMatrix) -> SolverResult<Box<dyn DecompositionResult>>;
}

/// Factorized form of a matrix `A`.
pub trait DecompositionResult: fmt::Debug {
    /// Solve `A·x = b`.
    fn solve(&self, b: &DoubleVector) -> SolverResult<DoubleVector>;

    /// Solve `A·X = B` column by column.
    fn solve_matrix(&self, b: &DoubleMatrix) -> SolverResult<DoubleMatrix>;

    /// Explicit inverse (or pseudo-inverse) of `A`.
    fn inverse(&self) -> SolverResult<DoubleMatrix>;
}

/// Built-in decompositions, selectable by name in configuration.
///
/// # Example
///
/// ```
/// use rootfinder_core::decomposition::DecompositionMethod;
///
/// let method: DecompositionMethod = "svd".parse().unwrap();
/// assert_eq!(method, DecompositionMethod::Svd);
/// assert_eq!(method.build().name(), "SVD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecompositionMethod {
    /// Partial-pivot LU (default).
    #[default]
    Lu,
    /// Regularized singular value decomposition.
    Svd,
}

impl DecompositionMethod {
    /// Build the decomposition with its default tolerance.
    pub fn build(self) -> Arc<dyn Decomposition> {
        match self {
            DecompositionMethod::Lu => Arc::new(LuDecomposition::default()),
            DecompositionMethod::Svd => Arc::new(SvdDecomposition::default()),
        }
    }

    /// Build the decomposition with an explicit relative tolerance.
    ///
    /// For LU this is the pivot tolerance, for SVD the singular value
    /// cut-off relative to the largest singular value.
    pub fn build_with_tolerance(self, tolerance: f64) -> Arc<dyn Decomposition> {
        match self {
            DecompositionMethod::Lu => Arc::new(LuDecomposition::with_pivot_tolerance(tolerance)),
            DecompositionMethod::Svd => {
                Arc::new(SvdDecomposition::with_relative_tolerance(tolerance))
            }
        }
    }
}

impl FromStr for DecompositionMethod {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lu" => Ok(DecompositionMethod::Lu),
            "svd" => Ok(DecompositionMethod::Svd),
            _ => Err(SolverError::invalid_argument(format!(
                "unknown decomposition '{}', expected one of: lu, svd",
                s
            ))),
        }
    }
}

impl fmt::Display for DecompositionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompositionMethod::Lu => write!(f, "lu"),
            DecompositionMethod::Svd => write!(f, "svd"),
        }
    }
}

/// Reject empty, non-square and non-finite input before factorizing.
fn validate_square(matrix: &DoubleMatrix, name: &str) -> SolverResult<()> {
    if matrix.is_empty() {
        return Err(SolverError::invalid_argument(format!(
            "{} decomposition of an empty matrix",
            name
        )));
    }
    if !matrix.is_square() {
        return Err(SolverError::dimension_mismatch(
            format!("{} decomposition", name),
            matrix.shape(),
            (matrix.rows(), matrix.rows()),
        ));
    }
    if !matrix.is_finite() {
        return Err(SolverError::invalid_argument(format!(
            "{} decomposition of a matrix with non-finite entries",
            name
        )));
    }
    Ok(())
}

/// Reject a right-hand side whose length differs from the system size.
fn validate_rhs(size: usize, rows: usize, cols: usize) -> SolverResult<()> {
    if rows != size {
        return Err(SolverError::dimension_mismatch(
            "decomposition solve",
            (size, size),
            (rows, cols),
        ));
    }
    Ok(())
}
