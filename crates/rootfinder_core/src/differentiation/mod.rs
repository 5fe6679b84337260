//! Jacobian providers for vector fields without an analytic derivative.
//!
//! - [`VectorFieldDifferentiator`]: forward, central or backward finite
//!   differences over any [`VectorFunction`](crate::function::VectorFunction)
//! - [`DualJacobian`]: exact forward-mode derivatives for fields written
//!   over `num_dual::Dual64` (requires the `num-dual-mode` feature)

mod finite_difference;

#[cfg(feature = "num-dual-mode")]
mod dual;

pub use finite_difference::{
    FiniteDifferenceJacobian, FiniteDifferenceType, VectorFieldDifferentiator,
};

#[cfg(feature = "num-dual-mode")]
pub use dual::{DualJacobian, DualValueFunction};
