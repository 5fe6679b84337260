//! Solver configuration.
//!
//! [`NewtonSolverConfig`] collects every knob of the concrete finders in one
//! plain value. With the `serde` feature it can be loaded from TOML:
//!
//! ```toml
//! absolute_tolerance = 1e-10
//! relative_tolerance = 0.0
//! max_steps = 200
//! decomposition = "svd"
//! decomposition_tolerance = 1e-12
//! damping = { kind = "backtracking", max_halvings = 8 }
//! ```
//!
//! Omitted keys fall back to [`NewtonSolverConfig::default`].

use crate::newton::{ConvergenceCriteria, StepDamping};
use rootfinder_core::decomposition::{Decomposition, DecompositionMethod};
use rootfinder_core::types::{SolverError, SolverResult};
use std::sync::Arc;
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration source could not be read or parsed.
    #[error("Failed to parse solver configuration: {0}")]
    Parse(String),

    /// The configuration parsed but holds invalid values.
    #[error("Invalid solver configuration: {0}")]
    Invalid(#[from] SolverError),
}

/// Settings shared by all vector root finders.
///
/// # Examples
///
/// ```
/// use rootfinder_core::decomposition::DecompositionMethod;
/// use rootfinder_newton::config::NewtonSolverConfig;
///
/// let config = NewtonSolverConfig::default()
///     .with_tolerances(1e-10, 0.0)
///     .with_decomposition(DecompositionMethod::Svd);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_steps, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewtonSolverConfig {
    /// Absolute residual tolerance.
    pub absolute_tolerance: f64,

    /// Residual tolerance relative to `‖f(x0)‖`.
    pub relative_tolerance: f64,

    /// Maximum number of Newton steps.
    pub max_steps: usize,

    /// Decomposition used to invert or solve with Jacobian estimates.
    pub decomposition: DecompositionMethod,

    /// Relative tolerance handed to the decomposition; `None` keeps its default.
    ///
    /// Pivot tolerance for LU, singular value cut-off for SVD.
    pub decomposition_tolerance: Option<f64>,

    /// Step damping.
    pub damping: StepDamping,
}

impl Default for NewtonSolverConfig {
    /// Default values:
    /// - `absolute_tolerance`: 1e-8
    /// - `relative_tolerance`: 1e-8
    /// - `max_steps`: 100
    /// - `decomposition`: LU with its default tolerance
    /// - `damping`: none
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-8,
            relative_tolerance: 1e-8,
            max_steps: 100,
            decomposition: DecompositionMethod::Lu,
            decomposition_tolerance: None,
            damping: StepDamping::None,
        }
    }
}

impl NewtonSolverConfig {
    /// Tight tolerances (1e-12) and a larger budget (500 steps).
    pub fn high_precision() -> Self {
        Self {
            absolute_tolerance: 1e-12,
            relative_tolerance: 1e-12,
            max_steps: 500,
            ..Self::default()
        }
    }

    /// Relaxed tolerances (1e-6) and a smaller budget (50 steps).
    pub fn fast() -> Self {
        Self {
            absolute_tolerance: 1e-6,
            relative_tolerance: 1e-6,
            max_steps: 50,
            ..Self::default()
        }
    }

    /// Set both tolerances.
    pub fn with_tolerances(mut self, absolute_tolerance: f64, relative_tolerance: f64) -> Self {
        self.absolute_tolerance = absolute_tolerance;
        self.relative_tolerance = relative_tolerance;
        self
    }

    /// Set the step budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Select the decomposition.
    pub fn with_decomposition(mut self, decomposition: DecompositionMethod) -> Self {
        self.decomposition = decomposition;
        self
    }

    /// Override the decomposition's relative tolerance.
    pub fn with_decomposition_tolerance(mut self, tolerance: f64) -> Self {
        self.decomposition_tolerance = Some(tolerance);
        self
    }

    /// Select the step damping.
    pub fn with_damping(mut self, damping: StepDamping) -> Self {
        self.damping = damping;
        self
    }

    /// Check every field and return the stopping rule.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for invalid tolerances, a zero step budget, a
    /// negative or non-finite decomposition tolerance, or backtracking with
    /// zero halvings.
    pub fn validate(&self) -> SolverResult<ConvergenceCriteria> {
        if let Some(tolerance) = self.decomposition_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(SolverError::invalid_argument(format!(
                    "decomposition_tolerance must be finite and non-negative, got {}",
                    tolerance
                )));
            }
        }
        if self.damping == (StepDamping::Backtracking { max_halvings: 0 }) {
            return Err(SolverError::invalid_argument(
                "backtracking damping needs max_halvings > 0",
            ));
        }
        ConvergenceCriteria::new(
            self.absolute_tolerance,
            self.relative_tolerance,
            self.max_steps,
        )
    }

    /// Instantiate the configured decomposition.
    pub fn build_decomposition(&self) -> Arc<dyn Decomposition> {
        match self.decomposition_tolerance {
            Some(tolerance) => self.decomposition.build_with_tolerance(tolerance),
            None => self.decomposition.build(),
        }
    }

    /// Parse and validate a TOML document.
    ///
    /// # Example
    ///
    /// ```
    /// use rootfinder_core::decomposition::DecompositionMethod;
    /// use rootfinder_newton::config::NewtonSolverConfig;
    ///
    /// let config = NewtonSolverConfig::from_toml_str(
    ///     r#"
    ///     max_steps = 40
    ///     decomposition = "svd"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.max_steps, 40);
    /// assert_eq!(config.decomposition, DecompositionMethod::Svd);
    /// assert_eq!(config.absolute_tolerance, 1e-8);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    #[cfg(feature = "serde")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Parse(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }
}
