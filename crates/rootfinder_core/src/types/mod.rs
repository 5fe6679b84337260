//! Shared result and error types.
//!
//! - `error`: the [`SolverError`] taxonomy used by every layer
//!
//! # Re-exports
//!
//! [`SolverError`] and the [`SolverResult`] alias are re-exported here.

pub mod error;

pub use error::{SolverError, SolverResult};
