//! Newton-type iteration for vector root finding.
//!
//! The driver ([`NewtonVectorRootFinder`]) is assembled from three
//! strategies chosen at construction:
//!
//! - [`EstimateInitialization`]: builds the first Jacobian (or inverse
//!   Jacobian) estimate at the starting point
//! - [`DirectionFunction`]: turns the estimate and the current residual into
//!   a step
//! - [`MatrixUpdateFunction`]: refreshes the estimate after each step, either
//!   by full recomputation or by a rank-one secant update
//!
//! The concrete finders in [`finders`] wire these together:
//!
//! | Finder | Estimate | Update |
//! |--------|----------|--------|
//! | [`NewtonDefaultRootFinder`] | inverse Jacobian | recompute and invert |
//! | [`BroydenRootFinder`] | inverse Jacobian | Sherman-Morrison rank-one |
//! | [`JacobianBroydenRootFinder`] | Jacobian | rank-one, solved each step |

pub mod direction;
pub mod driver;
pub mod finders;
pub mod initialization;
pub mod update;

pub use direction::{DirectionFunction, InverseJacobianDirection, JacobianDirection};
pub use driver::{
    ConvergenceCriteria, NewtonVectorRootFinder, SolveStatus, StepDamping, VectorRootFinder,
    VectorRootResult,
};
pub use finders::{BroydenRootFinder, JacobianBroydenRootFinder, NewtonDefaultRootFinder};
pub use initialization::{
    EstimateInitialization, InverseJacobianInitialization, JacobianInitialization,
};
pub use update::{
    BroydenInverseUpdate, BroydenJacobianUpdate, MatrixUpdateFunction, NewtonInverseUpdate,
    NewtonJacobianUpdate,
};
