//! Iteration driver shared by every Newton-type finder.

use super::direction::DirectionFunction;
use super::initialization::EstimateInitialization;
use super::update::MatrixUpdateFunction;
use rootfinder_core::differentiation::VectorFieldDifferentiator;
use rootfinder_core::function::{JacobianFunction, VectorFunction};
use rootfinder_core::linalg::{DenseMatrixAlgebra, DoubleVector, MatrixAlgebra};
use rootfinder_core::types::{SolverError, SolverResult};
use std::fmt;
use tracing::{debug, trace, warn};

const ALGEBRA: DenseMatrixAlgebra = DenseMatrixAlgebra;

/// Lifecycle of a single solve.
///
/// A returned [`VectorRootResult`] is always `Converged`. The other terminal
/// states are not returned; they are recorded on the `debug` event emitted
/// when a solve fails, next to the error. Callers tell failures apart by the
/// [`SolverError`] variant: `SingularMatrix` for `SingularJacobian`,
/// `ConvergenceFailure` for `MaxStepsExceeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Starting point evaluated, no estimate yet.
    Initialized,
    /// Stepping towards the root.
    Iterating,
    /// Residual norm within tolerance.
    Converged,
    /// Step budget exhausted or the residual became non-finite.
    MaxStepsExceeded,
    /// The decomposition rejected the Jacobian estimate.
    SingularJacobian,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Initialized => "initialized",
            SolveStatus::Iterating => "iterating",
            SolveStatus::Converged => "converged",
            SolveStatus::MaxStepsExceeded => "max steps exceeded",
            SolveStatus::SingularJacobian => "singular Jacobian",
        };
        f.write_str(name)
    }
}

/// Step length control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum StepDamping {
    /// Always take the full step (default).
    #[default]
    None,
    /// Halve the step while the residual norm does not decrease, at most
    /// `max_halvings` times; the last trial point is accepted regardless.
    Backtracking {
        /// Maximum number of halvings per step
        max_halvings: usize,
    },
}

/// Validated stopping rule.
///
/// A solve converges once `‖f(x_k)‖ ≤ absolute_tolerance +
/// relative_tolerance · ‖f(x_0)‖` and fails after `max_steps` steps.
///
/// # Example
///
/// ```
/// use rootfinder_newton::newton::ConvergenceCriteria;
///
/// let criteria = ConvergenceCriteria::new(1e-8, 1e-6, 50).unwrap();
/// assert!((criteria.target(10.0) - (1e-8 + 1e-5)).abs() < 1e-18);
///
/// assert!(ConvergenceCriteria::new(0.0, 0.0, 50).is_err());
/// assert!(ConvergenceCriteria::new(1e-8, 0.0, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCriteria {
    absolute_tolerance: f64,
    relative_tolerance: f64,
    max_steps: usize,
}

impl ConvergenceCriteria {
    /// Validate and build the stopping rule.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a tolerance is negative or non-finite, both
    /// tolerances are zero, or `max_steps` is zero.
    pub fn new(
        absolute_tolerance: f64,
        relative_tolerance: f64,
        max_steps: usize,
    ) -> SolverResult<Self> {
        for (name, value) in [
            ("absolute_tolerance", absolute_tolerance),
            ("relative_tolerance", relative_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SolverError::invalid_argument(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if absolute_tolerance == 0.0 && relative_tolerance == 0.0 {
            return Err(SolverError::invalid_argument(
                "absolute_tolerance and relative_tolerance cannot both be zero",
            ));
        }
        if max_steps == 0 {
            return Err(SolverError::invalid_argument("max_steps must be positive"));
        }
        Ok(Self {
            absolute_tolerance,
            relative_tolerance,
            max_steps,
        })
    }

    /// Absolute residual tolerance.
    pub fn absolute_tolerance(&self) -> f64 {
        self.absolute_tolerance
    }

    /// Tolerance relative to the initial residual norm.
    pub fn relative_tolerance(&self) -> f64 {
        self.relative_tolerance
    }

    /// Step budget.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Residual norm that counts as converged for a given initial norm.
    pub fn target(&self, initial_residual_norm: f64) -> f64 {
        self.absolute_tolerance + self.relative_tolerance * initial_residual_norm
    }
}

/// Outcome of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRootResult {
    /// Approximate root.
    pub root: DoubleVector,
    /// `f(root)`.
    pub residual: DoubleVector,
    /// Euclidean norm of `residual`.
    pub residual_norm: f64,
    /// Steps taken; zero when the starting point already satisfied the tolerance.
    pub steps: usize,
    /// Always [`SolveStatus::Converged`]. Failure states only reach the
    /// `debug` event of a failed solve; the error variant carries the cause.
    pub status: SolveStatus,
}

/// Common interface of the vector root finders.
///
/// Finders are immutable after construction and may be shared between
/// threads; every call works on its own iteration state.
pub trait VectorRootFinder: Send + Sync {
    /// Solve `f(x) = 0` from `x0` and report the iteration outcome.
    ///
    /// Without `jacobian` a forward finite-difference Jacobian of `f` is used.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty `x0` or malformed Jacobian
    /// - `DimensionMismatch` if `f(x0)` and `x0` differ in length
    /// - `SingularMatrix` if the decomposition rejects a Jacobian estimate
    /// - `ConvergenceFailure` if the step budget runs out or the residual
    ///   becomes non-finite
    fn solve_detailed(
        &self,
        f: &dyn VectorFunction,
        jacobian: Option<&dyn JacobianFunction>,
        x0: &DoubleVector,
    ) -> SolverResult<VectorRootResult>;

    /// Solve `f(x) = 0` from `x0` and return the root.
    fn solve(
        &self,
        f: &dyn VectorFunction,
        jacobian: Option<&dyn JacobianFunction>,
        x0: &DoubleVector,
    ) -> SolverResult<DoubleVector> {
        self.solve_detailed(f, jacobian, x0).map(|result| result.root)
    }

    /// Solve with a finite-difference Jacobian.
    fn find_root(&self, f: &dyn VectorFunction, x0: &DoubleVector) -> SolverResult<DoubleVector> {
        self.solve(f, None, x0)
    }

    /// Solve with an analytic Jacobian.
    fn find_root_with_jacobian(
        &self,
        f: &dyn VectorFunction,
        jacobian: &dyn JacobianFunction,
        x0: &DoubleVector,
    ) -> SolverResult<DoubleVector> {
        self.solve(f, Some(jacobian), x0)
    }
}

/// Per-call record of the iteration.
#[derive(Debug)]
struct IterationState {
    x: DoubleVector,
    residual: DoubleVector,
    residual_norm: f64,
    steps: usize,
    status: SolveStatus,
}

impl IterationState {
    fn new(x: DoubleVector, residual: DoubleVector) -> Self {
        let residual_norm = ALGEBRA.norm(&residual);
        Self {
            x,
            residual,
            residual_norm,
            steps: 0,
            status: SolveStatus::Initialized,
        }
    }

    fn into_result(self) -> VectorRootResult {
        VectorRootResult {
            root: self.x,
            residual: self.residual,
            residual_norm: self.residual_norm,
            steps: self.steps,
            status: self.status,
        }
    }
}

/// Newton-type iteration assembled from pluggable strategies.
///
/// # Example
///
/// ```
/// use rootfinder_core::decomposition::{Decomposition, LuDecomposition};
/// use rootfinder_core::linalg::DoubleVector;
/// use rootfinder_newton::newton::{
///     ConvergenceCriteria, InverseJacobianDirection, InverseJacobianInitialization,
///     NewtonInverseUpdate, NewtonVectorRootFinder, VectorRootFinder,
/// };
/// use std::sync::Arc;
///
/// let lu: Arc<dyn Decomposition> = Arc::new(LuDecomposition::default());
/// let finder = NewtonVectorRootFinder::new(
///     ConvergenceCriteria::new(1e-12, 0.0, 50).unwrap(),
///     Box::new(InverseJacobianInitialization::new(lu.clone())),
///     Box::new(InverseJacobianDirection::default()),
///     Box::new(NewtonInverseUpdate::new(lu)),
/// );
///
/// let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[0] - 2.0]);
/// let root = finder.find_root(&f, &DoubleVector::new(vec![1.0])).unwrap();
/// assert!((root[0] - 2.0_f64.sqrt()).abs() < 1e-10);
/// ```
#[derive(Debug)]
pub struct NewtonVectorRootFinder {
    criteria: ConvergenceCriteria,
    damping: StepDamping,
    initialization: Box<dyn EstimateInitialization>,
    direction: Box<dyn DirectionFunction>,
    update: Box<dyn MatrixUpdateFunction>,
}

impl NewtonVectorRootFinder {
    /// Driver from a stopping rule and the three strategies, without damping.
    pub fn new(
        criteria: ConvergenceCriteria,
        initialization: Box<dyn EstimateInitialization>,
        direction: Box<dyn DirectionFunction>,
        update: Box<dyn MatrixUpdateFunction>,
    ) -> Self {
        Self {
            criteria,
            damping: StepDamping::None,
            initialization,
            direction,
            update,
        }
    }

    /// Replace the step damping.
    pub fn with_damping(mut self, damping: StepDamping) -> Self {
        self.damping = damping;
        self
    }

    /// Stopping rule.
    pub fn criteria(&self) -> &ConvergenceCriteria {
        &self.criteria
    }

    /// Step damping.
    pub fn damping(&self) -> StepDamping {
        self.damping
    }

    fn iterate(
        &self,
        f: &dyn VectorFunction,
        jacobian: &dyn JacobianFunction,
        x0: &DoubleVector,
    ) -> SolverResult<VectorRootResult> {
        if x0.is_empty() {
            return Err(SolverError::invalid_argument("initial point is empty"));
        }
        let y0 = f.evaluate(x0);
        if y0.len() != x0.len() {
            return Err(SolverError::dimension_mismatch(
                "function evaluation",
                x0.shape(),
                y0.shape(),
            ));
        }

        let mut state = IterationState::new(x0.clone(), y0);
        let target = self.criteria.target(state.residual_norm);
        debug!(
            dimension = x0.len(),
            initial_residual = state.residual_norm,
            target,
            max_steps = self.criteria.max_steps,
            "starting vector root search"
        );

        if !state.residual_norm.is_finite() {
            return Err(self.fail(&mut state, None));
        }
        if state.residual_norm <= target {
            return Ok(self.finish(state));
        }

        let mut estimate = self
            .initialization
            .initialize(jacobian, &state.x)
            .map_err(|e| self.fail(&mut state, Some(e)))?;
        state.status = SolveStatus::Iterating;

        loop {
            let direction = self
                .direction
                .direction(&estimate, &state.residual)
                .map_err(|e| self.fail(&mut state, Some(e)))?;
            let (x_next, y_next, delta_x) = self
                .take_step(f, &state, direction)
                .map_err(|e| self.fail(&mut state, Some(e)))?;
            let delta_y = ALGEBRA
                .subtract_vectors(&y_next, &state.residual)
                .map_err(|e| self.fail(&mut state, Some(e)))?;

            state.steps += 1;
            state.x = x_next;
            state.residual = y_next;
            state.residual_norm = ALGEBRA.norm(&state.residual);
            trace!(step = state.steps, residual = state.residual_norm, "newton step");

            if !state.residual_norm.is_finite() {
                return Err(self.fail(&mut state, None));
            }
            if state.residual_norm <= target {
                return Ok(self.finish(state));
            }
            if state.steps >= self.criteria.max_steps {
                break;
            }

            estimate = self
                .update
                .update(jacobian, &state.x, Some(&delta_x), Some(&delta_y), Some(&estimate))
                .map_err(|e| self.fail(&mut state, Some(e)))?;
        }

        Err(self.fail(&mut state, None))
    }

    /// Apply `direction` from the current point, halving it under backtracking.
    ///
    /// Returns the new point, its residual and the step actually taken.
    fn take_step(
        &self,
        f: &dyn VectorFunction,
        state: &IterationState,
        direction: DoubleVector,
    ) -> SolverResult<(DoubleVector, DoubleVector, DoubleVector)> {
        let mut step = direction;
        let mut x_next = ALGEBRA.add_vectors(&state.x, &step)?;
        let mut y_next = f.evaluate(&x_next);

        if let StepDamping::Backtracking { max_halvings } = self.damping {
            let mut halvings = 0;
            // NaN norms compare false and keep halving.
            while !(ALGEBRA.norm(&y_next) < state.residual_norm) {
                if halvings == max_halvings {
                    warn!(
                        step = state.steps + 1,
                        halvings, "backtracking exhausted, accepting last trial point"
                    );
                    break;
                }
                step = ALGEBRA.scale_vector(&step, 0.5);
                x_next = ALGEBRA.add_vectors(&state.x, &step)?;
                y_next = f.evaluate(&x_next);
                halvings += 1;
            }
        }

        Ok((x_next, y_next, step))
    }

    fn finish(&self, mut state: IterationState) -> VectorRootResult {
        state.status = SolveStatus::Converged;
        debug!(
            steps = state.steps,
            residual = state.residual_norm,
            "vector root search converged"
        );
        state.into_result()
    }

    /// Record the terminal status and produce the error to return.
    ///
    /// Without `cause` the failure is a convergence failure at the current step.
    fn fail(&self, state: &mut IterationState, cause: Option<SolverError>) -> SolverError {
        let error = match cause {
            Some(error) => {
                if error.is_singular_matrix() {
                    state.status = SolveStatus::SingularJacobian;
                }
                error
            }
            None => {
                state.status = SolveStatus::MaxStepsExceeded;
                SolverError::convergence_failure(state.steps, state.residual_norm)
            }
        };
        debug!(
            status = %state.status,
            steps = state.steps,
            residual = state.residual_norm,
            error = %error,
            "vector root search failed"
        );
        error
    }
}

impl VectorRootFinder for NewtonVectorRootFinder {
    fn solve_detailed(
        &self,
        f: &dyn VectorFunction,
        jacobian: Option<&dyn JacobianFunction>,
        x0: &DoubleVector,
    ) -> SolverResult<VectorRootResult> {
        match jacobian {
            Some(jacobian) => self.iterate(f, jacobian, x0),
            None => {
                let differentiated = VectorFieldDifferentiator::default().differentiate(f);
                self.iterate(f, &differentiated, x0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newton::direction::InverseJacobianDirection;
    use crate::newton::initialization::InverseJacobianInitialization;
    use crate::newton::update::{BroydenInverseUpdate, NewtonInverseUpdate};
    use approx::assert_relative_eq;
    use rootfinder_core::decomposition::{Decomposition, LuDecomposition};
    use rootfinder_core::linalg::DoubleMatrix;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory sink for formatted tracing output.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs<T>(run: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let output = tracing::subscriber::with_default(subscriber, run);
        let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
        (output, text)
    }

    fn newton(criteria: ConvergenceCriteria) -> NewtonVectorRootFinder {
        let lu: Arc<dyn Decomposition> = Arc::new(LuDecomposition::default());
        NewtonVectorRootFinder::new(
            criteria,
            Box::new(InverseJacobianInitialization::new(lu.clone())),
            Box::new(InverseJacobianDirection::default()),
            Box::new(NewtonInverseUpdate::new(lu)),
        )
    }

    fn broyden(criteria: ConvergenceCriteria) -> NewtonVectorRootFinder {
        let lu: Arc<dyn Decomposition> = Arc::new(LuDecomposition::default());
        NewtonVectorRootFinder::new(
            criteria,
            Box::new(InverseJacobianInitialization::new(lu)),
            Box::new(InverseJacobianDirection::default()),
            Box::new(BroydenInverseUpdate::default()),
        )
    }

    fn criteria() -> ConvergenceCriteria {
        ConvergenceCriteria::new(1e-12, 0.0, 50).unwrap()
    }

    fn circle_line(x: &DoubleVector) -> DoubleVector {
        DoubleVector::new(vec![x[0] * x[0] + x[1] * x[1] - 5.0, x[0] * x[1] - 2.0])
    }

    #[test]
    fn test_criteria_validation() {
        assert!(ConvergenceCriteria::new(1e-8, 1e-8, 100).is_ok());
        assert!(ConvergenceCriteria::new(0.0, 1e-8, 100).is_ok());
        let invalid = [
            (-1e-8, 1e-8, 100),
            (f64::NAN, 1e-8, 100),
            (1e-8, f64::INFINITY, 100),
            (0.0, 0.0, 100),
            (1e-8, 1e-8, 0),
        ];
        for (absolute, relative, max_steps) in invalid {
            assert!(ConvergenceCriteria::new(absolute, relative, max_steps)
                .unwrap_err()
                .is_invalid_argument());
        }
    }

    #[test]
    fn test_converged_start_takes_no_steps() {
        let result = newton(criteria())
            .solve_detailed(&circle_line, None, &DoubleVector::new(vec![1.0, 2.0]))
            .unwrap();
        assert_eq!(result.steps, 0);
        assert_eq!(result.status, SolveStatus::Converged);
        assert_eq!(result.root.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_newton_converges_with_finite_difference() {
        let result = newton(criteria())
            .solve_detailed(&circle_line, None, &DoubleVector::new(vec![1.2, 1.8]))
            .unwrap();
        assert_eq!(result.status, SolveStatus::Converged);
        assert!(result.steps > 0);
        assert!(result.residual_norm <= 1e-12);
        assert_relative_eq!(result.root[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.root[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_relative_tolerance_scales_with_initial_residual() {
        let loose = ConvergenceCriteria::new(0.0, 0.5, 50).unwrap();
        let x0 = DoubleVector::new(vec![1.2, 1.8]);
        let result = newton(loose).solve_detailed(&circle_line, None, &x0).unwrap();
        let initial = ALGEBRA.norm(&circle_line(&x0));
        assert!(result.residual_norm <= 0.5 * initial);
        assert!(result.steps <= 2);
    }

    #[test]
    fn test_max_steps_exceeded() {
        // x² + 1 has no real root.
        let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[0] + 1.0]);
        let budget = ConvergenceCriteria::new(1e-12, 0.0, 7).unwrap();
        let err = broyden(budget)
            .solve(&f, None, &DoubleVector::new(vec![0.5]))
            .unwrap_err();
        match err {
            SolverError::ConvergenceFailure { iterations, residual } => {
                assert!(iterations <= 7);
                assert!(residual.is_nan() || residual >= 1.0);
            }
            other => panic!("expected convergence failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_start_rejected() {
        let err = newton(criteria())
            .solve(&circle_line, None, &DoubleVector::new(vec![]))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let f = |_: &DoubleVector| DoubleVector::zeros(3);
        let err = newton(criteria())
            .solve(&f, None, &DoubleVector::zeros(2))
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_non_finite_start_fails() {
        let f = |x: &DoubleVector| DoubleVector::new(vec![x[0].ln()]);
        let err = newton(criteria())
            .solve(&f, None, &DoubleVector::new(vec![-1.0]))
            .unwrap_err();
        assert!(err.is_convergence_failure());
    }

    #[test]
    fn test_backtracking_rescues_divergent_newton() {
        // Undamped Newton on atan diverges from |x0| > 1.39.
        let f = |x: &DoubleVector| DoubleVector::new(vec![x[0].atan()]);
        let j = |x: &DoubleVector| DoubleMatrix::from_fn(1, 1, |_, _| 1.0 / (1.0 + x[0] * x[0]));
        let x0 = DoubleVector::new(vec![2.0]);

        let undamped = newton(criteria());
        assert!(undamped.find_root_with_jacobian(&f, &j, &x0).is_err());

        let damped =
            newton(criteria()).with_damping(StepDamping::Backtracking { max_halvings: 10 });
        let root = damped.find_root_with_jacobian(&f, &j, &x0).unwrap();
        assert!(root[0].abs() < 1e-10);
    }

    #[test]
    fn test_residual_length_change_after_first_step_is_reported() {
        // Two outputs at the start, three anywhere else.
        let f = |x: &DoubleVector| {
            if x[0] == 1.0 {
                DoubleVector::new(vec![x[0] - 2.0, x[1] - 1.0])
            } else {
                DoubleVector::zeros(3)
            }
        };
        let j = |_: &DoubleVector| DoubleMatrix::identity(2);
        let x0 = DoubleVector::new(vec![1.0, 0.0]);

        let (outcome, logs) =
            with_captured_logs(|| newton(criteria()).find_root_with_jacobian(&f, &j, &x0));
        assert!(outcome.unwrap_err().is_dimension_mismatch());
        assert!(logs.contains("vector root search failed"), "{}", logs);
    }

    #[test]
    fn test_failure_status_is_logged_not_returned() {
        // Singular at the start: the LU decomposition rejects J(0).
        let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[0] - 1.0]);
        let j = |x: &DoubleVector| DoubleMatrix::from_fn(1, 1, |_, _| 2.0 * x[0]);
        let x0 = DoubleVector::new(vec![0.0]);
        let (outcome, logs) =
            with_captured_logs(|| newton(criteria()).find_root_with_jacobian(&f, &j, &x0));
        assert!(outcome.unwrap_err().is_singular_matrix());
        assert!(logs.contains("status=singular Jacobian"), "{}", logs);

        // x² + 1 has no real root.
        let f = |x: &DoubleVector| DoubleVector::new(vec![x[0] * x[0] + 1.0]);
        let budget = ConvergenceCriteria::new(1e-12, 0.0, 5).unwrap();
        let x0 = DoubleVector::new(vec![0.5]);
        let (outcome, logs) = with_captured_logs(|| broyden(budget).solve(&f, None, &x0));
        assert!(outcome.unwrap_err().is_convergence_failure());
        assert!(logs.contains("status=max steps exceeded"), "{}", logs);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolveStatus::Converged.to_string(), "converged");
        assert_eq!(SolveStatus::SingularJacobian.to_string(), "singular Jacobian");
    }
}
