//! # rootfinder_newton
//!
//! Newton and Broyden solvers for square nonlinear systems `f(x) = 0`.
//!
//! ## Architecture Position
//!
//! Layer 2 of the workspace. Depends on `rootfinder_core` (L1) for vectors,
//! matrices, decompositions and Jacobian providers.
//!
//! ## Modules
//!
//! - `newton`: estimate initialization, direction and update strategies,
//!   the iteration driver and the concrete finders
//! - `config`: `NewtonSolverConfig`, loadable from TOML with the `serde` feature
//!
//! ## Example
//!
//! ```rust
//! use rootfinder_core::decomposition::SvdDecomposition;
//! use rootfinder_core::linalg::DoubleVector;
//! use rootfinder_newton::prelude::*;
//! use std::sync::Arc;
//!
//! let finder = BroydenRootFinder::new(1e-10, 0.0, 100)
//!     .unwrap()
//!     .with_decomposition(Arc::new(SvdDecomposition::default()));
//!
//! let f = |x: &DoubleVector| {
//!     DoubleVector::new(vec![x[0] + x[1] - 3.0, x[0] * x[1] - 2.0])
//! };
//! let root = finder.find_root(&f, &DoubleVector::new(vec![0.8, 2.3])).unwrap();
//! assert!((root[0] - 1.0).abs() < 1e-8);
//! assert!((root[1] - 2.0).abs() < 1e-8);
//! ```
//!
//! ## Logging
//!
//! The driver emits `tracing` events: `debug` when a solve starts, converges
//! or fails, `trace` per step, and `warn` when a Broyden update is skipped or
//! backtracking runs out of halvings. Install any subscriber to see them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod newton;

pub use config::{ConfigError, NewtonSolverConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigError, NewtonSolverConfig};
    pub use crate::newton::*;
}
