//! # rootfinder_core: Linear-Algebra Foundation for Vector Root Finding
//!
//! ## Layer 1 (Foundation) Role
//!
//! rootfinder_core serves as the bottom layer of the workspace, providing:
//! - Immutable vector and matrix types with shape-checked algebra (`linalg`)
//! - Pluggable factorizations: LU and regularized SVD (`decomposition`)
//! - Function traits for vector fields and their Jacobians (`function`)
//! - Finite-difference and dual-number Jacobians (`differentiation`)
//! - Error taxonomy: `SolverError` (`types::error`)
//!
//! ## Dependencies
//!
//! Layer 1 has no dependencies on other rootfinder_* crates:
//! - nalgebra: dense storage, LU and SVD kernels
//! - num-dual: dual numbers for exact Jacobians (optional)
//! - thiserror: error derive
//! - serde: serialisation of configuration enums (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use rootfinder_core::decomposition::{Decomposition, LuDecomposition};
//! use rootfinder_core::linalg::{DoubleMatrix, DoubleVector};
//!
//! let a = DoubleMatrix::new(vec![vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
//! let b = DoubleVector::new(vec![1.0, 2.0]);
//!
//! let lu = LuDecomposition::default().decompose(&a).unwrap();
//! let x = lu.solve(&b).unwrap();
//! # assert!((4.0 * x[0] + x[1] - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `num-dual-mode` (default): `DualJacobian` via num-dual
//! - `serde` (default): serialisation for `DecompositionMethod` and `SolverError`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod decomposition;
pub mod differentiation;
pub mod function;
pub mod linalg;
pub mod types;
