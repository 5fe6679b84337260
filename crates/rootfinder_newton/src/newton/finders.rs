//! Ready-made Newton and Broyden root finders.
//!
//! Each finder fixes its decomposition at construction and shares it between
//! its strategies. Builder methods consume the finder and return a new one.

use super::direction::{InverseJacobianDirection, JacobianDirection};
use super::driver::{
    ConvergenceCriteria, NewtonVectorRootFinder, StepDamping, VectorRootFinder, VectorRootResult,
};
use super::initialization::{InverseJacobianInitialization, JacobianInitialization};
use super::update::{BroydenInverseUpdate, BroydenJacobianUpdate, NewtonInverseUpdate};
use crate::config::NewtonSolverConfig;
use rootfinder_core::decomposition::{Decomposition, DecompositionMethod};
use rootfinder_core::function::{JacobianFunction, VectorFunction};
use rootfinder_core::linalg::DoubleVector;
use rootfinder_core::types::SolverResult;
use std::sync::Arc;

/// Full Newton iteration on the inverse Jacobian.
///
/// Evaluates and inverts `J(x)` at every step: quadratic convergence near a
/// regular root, at the cost of one Jacobian and one decomposition per step.
///
/// # Example
///
/// ```
/// use rootfinder_core::linalg::DoubleVector;
/// use rootfinder_newton::newton::{NewtonDefaultRootFinder, VectorRootFinder};
///
/// let finder = NewtonDefaultRootFinder::new(1e-10, 1e-10, 50).unwrap();
/// let f = |x: &DoubleVector| {
///     DoubleVector::new(vec![x[0] * x[0] + x[1] * x[1] - 5.0, x[0] * x[1] - 2.0])
/// };
/// let root = finder.find_root(&f, &DoubleVector::new(vec![1.2, 1.8])).unwrap();
/// assert!((root[0] - 1.0).abs() < 1e-8);
/// assert!((root[1] - 2.0).abs() < 1e-8);
/// ```
#[derive(Debug)]
pub struct NewtonDefaultRootFinder {
    decomposition: Arc<dyn Decomposition>,
    driver: NewtonVectorRootFinder,
}

impl NewtonDefaultRootFinder {
    /// LU-based finder with the given stopping rule.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for invalid tolerances or `max_steps == 0`.
    pub fn new(
        absolute_tolerance: f64,
        relative_tolerance: f64,
        max_steps: usize,
    ) -> SolverResult<Self> {
        let criteria = ConvergenceCriteria::new(absolute_tolerance, relative_tolerance, max_steps)?;
        Ok(Self::assemble(
            criteria,
            DecompositionMethod::Lu.build(),
            StepDamping::None,
        ))
    }

    /// Finder built from a validated configuration.
    pub fn from_config(config: &NewtonSolverConfig) -> SolverResult<Self> {
        let criteria = config.validate()?;
        Ok(Self::assemble(
            criteria,
            config.build_decomposition(),
            config.damping,
        ))
    }

    /// Same finder with another decomposition.
    pub fn with_decomposition(self, decomposition: Arc<dyn Decomposition>) -> Self {
        Self::assemble(*self.driver.criteria(), decomposition, self.driver.damping())
    }

    /// Same finder with another step damping.
    pub fn with_damping(self, damping: StepDamping) -> Self {
        Self {
            decomposition: self.decomposition,
            driver: self.driver.with_damping(damping),
        }
    }

    /// Decomposition in use.
    pub fn decomposition(&self) -> &dyn Decomposition {
        self.decomposition.as_ref()
    }

    /// Stopping rule in use.
    pub fn criteria(&self) -> &ConvergenceCriteria {
        self.driver.criteria()
    }

    fn assemble(
        criteria: ConvergenceCriteria,
        decomposition: Arc<dyn Decomposition>,
        damping: StepDamping,
    ) -> Self {
        let driver = NewtonVectorRootFinder::new(
            criteria,
            Box::new(InverseJacobianInitialization::new(Arc::clone(&decomposition))),
            Box::new(InverseJacobianDirection::default()),
            Box::new(NewtonInverseUpdate::new(Arc::clone(&decomposition))),
        )
        .with_damping(damping);
        Self {
            decomposition,
            driver,
        }
    }
}

impl VectorRootFinder for NewtonDefaultRootFinder {
    fn solve_detailed(
        &self,
        f: &dyn VectorFunction,
        jacobian: Option<&dyn JacobianFunction>,
        x0: &DoubleVector,
    ) -> SolverResult<VectorRootResult> {
        self.driver.solve_detailed(f, jacobian, x0)
    }
}

/// Broyden quasi-Newton iteration on the inverse Jacobian.
///
/// Inverts `J(x0)` once, then maintains the inverse with the Sherman-Morrison
/// rank-one update ([`BroydenInverseUpdate`]). Each step costs one function
/// evaluation and O(N²) algebra; convergence is superlinear.
#[derive(Debug)]
pub struct BroydenRootFinder {
    decomposition: Arc<dyn Decomposition>,
    update: BroydenInverseUpdate,
    driver: NewtonVectorRootFinder,
}

impl BroydenRootFinder {
    /// LU-based finder with the given stopping rule.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for invalid tolerances or `max_steps == 0`.
    pub fn new(
        absolute_tolerance: f64,
        relative_tolerance: f64,
        max_steps: usize,
    ) -> SolverResult<Self> {
        let criteria = ConvergenceCriteria::new(absolute_tolerance, relative_tolerance, max_steps)?;
        Ok(Self::assemble(
            criteria,
            DecompositionMethod::Lu.build(),
            StepDamping::None,
            BroydenInverseUpdate::default(),
        ))
    }

    /// Finder built from a validated configuration.
    pub fn from_config(config: &NewtonSolverConfig) -> SolverResult<Self> {
        let criteria = config.validate()?;
        Ok(Self::assemble(
            criteria,
            config.build_decomposition(),
            config.damping,
            BroydenInverseUpdate::default(),
        ))
    }

    /// Same finder with another decomposition.
    pub fn with_decomposition(self, decomposition: Arc<dyn Decomposition>) -> Self {
        Self::assemble(
            *self.driver.criteria(),
            decomposition,
            self.driver.damping(),
            self.update,
        )
    }

    /// Same finder with another step damping.
    pub fn with_damping(self, damping: StepDamping) -> Self {
        Self {
            driver: self.driver.with_damping(damping),
            ..self
        }
    }

    /// Same finder with another relative threshold for skipping degenerate
    /// Broyden updates.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless the tolerance is finite and non-negative.
    pub fn with_denominator_tolerance(self, denominator_tolerance: f64) -> SolverResult<Self> {
        let update = BroydenInverseUpdate::with_denominator_tolerance(denominator_tolerance)?;
        Ok(Self::assemble(
            *self.driver.criteria(),
            self.decomposition,
            self.driver.damping(),
            update,
        ))
    }

    /// Relative threshold for skipping degenerate Broyden updates.
    pub fn denominator_tolerance(&self) -> f64 {
        self.update.denominator_tolerance()
    }

    /// Decomposition in use.
    pub fn decomposition(&self) -> &dyn Decomposition {
        self.decomposition.as_ref()
    }

    /// Stopping rule in use.
    pub fn criteria(&self) -> &ConvergenceCriteria {
        self.driver.criteria()
    }

    fn assemble(
        criteria: ConvergenceCriteria,
        decomposition: Arc<dyn Decomposition>,
        damping: StepDamping,
        update: BroydenInverseUpdate,
    ) -> Self {
        let driver = NewtonVectorRootFinder::new(
            criteria,
            Box::new(InverseJacobianInitialization::new(Arc::clone(&decomposition))),
            Box::new(InverseJacobianDirection::default()),
            Box::new(update),
        )
        .with_damping(damping);
        Self {
            decomposition,
            update,
            driver,
        }
    }
}

impl VectorRootFinder for BroydenRootFinder {
    fn solve_detailed(
        &self,
        f: &dyn VectorFunction,
        jacobian: Option<&dyn JacobianFunction>,
        x0: &DoubleVector,
    ) -> SolverResult<VectorRootResult> {
        self.driver.solve_detailed(f, jacobian, x0)
    }
}

/// Broyden iteration on the Jacobian itself.
///
/// Keeps `J` rather than its inverse, applies [`BroydenJacobianUpdate`] and
/// solves `J·Δx = −f` with the decomposition at every step. Trades an O(N³)
/// factorization per step for never forming an explicit inverse.
#[derive(Debug)]
pub struct JacobianBroydenRootFinder {
    decomposition: Arc<dyn Decomposition>,
    driver: NewtonVectorRootFinder,
}

impl JacobianBroydenRootFinder {
    /// LU-based finder with the given stopping rule.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for invalid tolerances or `max_steps == 0`.
    pub fn new(
        absolute_tolerance: f64,
        relative_tolerance: f64,
        max_steps: usize,
    ) -> SolverResult<Self> {
        let criteria = ConvergenceCriteria::new(absolute_tolerance, relative_tolerance, max_steps)?;
        Ok(Self::assemble(
            criteria,
            DecompositionMethod::Lu.build(),
            StepDamping::None,
        ))
    }

    /// Finder built from a validated configuration.
    pub fn from_config(config: &NewtonSolverConfig) -> SolverResult<Self> {
        let criteria = config.validate()?;
        Ok(Self::assemble(
            criteria,
            config.build_decomposition(),
            config.damping,
        ))
    }

    /// Same finder with another decomposition.
    pub fn with_decomposition(self, decomposition: Arc<dyn Decomposition>) -> Self {
        Self::assemble(*self.driver.criteria(), decomposition, self.driver.damping())
    }

    /// Same finder with another step damping.
    pub fn with_damping(self, damping: StepDamping) -> Self {
        Self {
            decomposition: self.decomposition,
            driver: self.driver.with_damping(damping),
        }
    }

    /// Decomposition in use.
    pub fn decomposition(&self) -> &dyn Decomposition {
        self.decomposition.as_ref()
    }

    /// Stopping rule in use.
    pub fn criteria(&self) -> &ConvergenceCriteria {
        self.driver.criteria()
    }

    fn assemble(
        criteria: ConvergenceCriteria,
        decomposition: Arc<dyn Decomposition>,
        damping: StepDamping,
    ) -> Self {
        let driver = NewtonVectorRootFinder::new(
            criteria,
            Box::new(JacobianInitialization),
            Box::new(JacobianDirection::new(Arc::clone(&decomposition))),
            Box::new(BroydenJacobianUpdate::default()),
        )
        .with_damping(damping);
        Self {
            decomposition,
            driver,
        }
    }
}

impl VectorRootFinder for JacobianBroydenRootFinder {
    fn solve_detailed(
        &self,
        f: &dyn VectorFunction,
        jacobian: Option<&dyn JacobianFunction>,
        x0: &DoubleVector,
    ) -> SolverResult<VectorRootResult> {
        self.driver.solve_detailed(f, jacobian, x0)
    }
}
