//! Core optimizer traits and types.
//!
//! Every descent algorithm in this workspace follows the same outer loop
//! and stopping policy:
//!
//! 1. **Initialization**: `x = x₀`, `k = 0`, convergence latch cleared
//! 2. **Gradient test**: stop when `‖∇f(x)‖ ≤ ε₁`
//! 3. **Step**: compute a direction and a step length, producing a new `x`
//! 4. **Convergence test**: `‖x − x_prev‖ < ε₂` and `|f(x) − f(x_prev)| < ε₂`
//!    must hold in two *consecutive* iterations before the algorithm returns
//! 5. **Budget**: stop after `M` iterations
//!
//! A single small step is treated as noise rather than convergence; the
//! latch in [`ConvergenceChecker`] implements the "twice in a row" rule.
//!
//! Hitting the iteration budget is not an error. The result carries
//! [`TerminationReason::MaxIterations`] and `iterations == M`, and the
//! caller decides what to make of it.
//!
//! # Examples
//!
//! ```rust
//! # use descentopt_core::prelude::*;
//! let criterion = StoppingCriterion::new()
//!     .with_gradient_tolerance(1e-4)
//!     .with_step_tolerance(1e-6)
//!     .with_max_iterations(1000);
//! criterion.validate()?;
//! # Ok::<(), OptimizerError>(())
//! ```

use crate::core::{
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    types::Point,
};
use std::fmt::Debug;
use std::time::Duration;

/// Result of an optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    /// The final point found by the optimizer
    pub point: Point,

    /// The objective function value at the final point
    pub value: f64,

    /// Norm of the last gradient computed, `None` if no iteration ran.
    ///
    /// On [`TerminationReason::GradientTolerance`] this is the norm at
    /// `point`. On [`TerminationReason::Converged`] and
    /// [`TerminationReason::MaxIterations`] it belongs to the iterate the
    /// final step started from, since no gradient is taken at `point`.
    pub gradient_norm: Option<f64>,

    /// Number of completed iterations `k`
    pub iterations: usize,

    /// Total number of objective evaluations, including those made for
    /// finite differences and line searches
    pub function_evaluations: usize,

    /// Wall-clock time elapsed during optimization
    pub duration: Duration,

    /// Reason for algorithm termination
    pub termination_reason: TerminationReason,

    /// True unless the iteration budget ran out
    pub converged: bool,
}

impl OptimizationResult {
    /// Creates a new optimization result.
    pub fn new(
        point: Point,
        value: f64,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        let converged = matches!(
            termination_reason,
            TerminationReason::Converged | TerminationReason::GradientTolerance
        );

        Self {
            point,
            value,
            gradient_norm: None,
            iterations,
            function_evaluations: 0,
            duration,
            termination_reason,
            converged,
        }
    }

    /// Sets the gradient norm at the final point.
    pub fn with_gradient_norm(mut self, norm: Option<f64>) -> Self {
        self.gradient_norm = norm;
        self
    }

    /// Sets the function evaluation count.
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }
}

/// Reasons for optimization algorithm termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// Step and value changes stayed under `ε₂` in two consecutive iterations
    Converged,
    /// The gradient norm fell to `ε₁` or below
    GradientTolerance,
    /// The iteration budget `M` was exhausted
    MaxIterations,
}

/// Stopping criteria shared by all descent algorithms.
///
/// - **gradient_tolerance** `ε₁`: stop when `‖∇f(x)‖ ≤ ε₁`
/// - **step_tolerance** `ε₂`: bound on both `‖x − x_prev‖` and `|f(x) − f(x_prev)|`
/// - **max_iterations** `M`: iteration budget; `0` returns the initial point
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoppingCriterion {
    /// Tolerance on the gradient norm
    pub gradient_tolerance: f64,

    /// Tolerance on step length and objective change
    pub step_tolerance: f64,

    /// Maximum number of iterations
    pub max_iterations: usize,
}

impl Default for StoppingCriterion {
    fn default() -> Self {
        Self {
            gradient_tolerance: 1e-4,
            step_tolerance: 1e-6,
            max_iterations: 1000,
        }
    }
}

impl StoppingCriterion {
    /// Creates a new stopping criterion with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gradient tolerance `ε₁`.
    pub fn with_gradient_tolerance(mut self, tol: f64) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Sets the step and value change tolerance `ε₂`.
    pub fn with_step_tolerance(mut self, tol: f64) -> Self {
        self.step_tolerance = tol;
        self
    }

    /// Sets the maximum number of iterations `M`.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Validates the tolerances.
    pub fn validate(&self) -> Result<()> {
        OptimizerError::require_positive("gradient_tolerance", self.gradient_tolerance)?;
        OptimizerError::require_positive("step_tolerance", self.step_tolerance)?;
        Ok(())
    }
}

/// Latch implementing the "two consecutive small steps" convergence rule.
#[derive(Debug, Clone)]
pub struct ConvergenceChecker {
    tolerance: f64,
    matching: bool,
}

impl ConvergenceChecker {
    /// Creates a checker with step/value tolerance `ε₂`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            matching: false,
        }
    }

    /// Whether the previous iteration was already a small step.
    pub fn is_matching(&self) -> bool {
        self.matching
    }

    /// Clears the latch.
    pub fn reset(&mut self) {
        self.matching = false;
    }

    /// Records one iteration and reports whether the algorithm has converged.
    ///
    /// A small step sets the latch, a second small step in a row returns
    /// `true`, and any larger step clears the latch.
    pub fn update(
        &mut self,
        point: &Point,
        previous_point: &Point,
        value: f64,
        previous_value: f64,
    ) -> bool {
        let small_step = (point - previous_point).norm() < self.tolerance
            && (value - previous_value).abs() < self.tolerance;

        if !small_step {
            self.matching = false;
            return false;
        }
        if self.matching {
            return true;
        }
        self.matching = true;
        false
    }
}

/// Universal interface for descent algorithms.
pub trait Optimizer: Debug {
    /// Returns a human-readable name identifying the algorithm.
    fn name(&self) -> &str;

    /// Minimizes `cost_fn` starting from `initial_point`.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the initial point does not fit the objective
    /// - `InvalidConfiguration` for invalid tolerances or step parameters
    /// - `LineSearchFailed` if a backtracking search exhausts its budget
    /// - `NumericalError` if the objective is not finite at the initial point
    fn optimize<C>(
        &mut self,
        cost_fn: &C,
        initial_point: &Point,
        stopping_criterion: &StoppingCriterion,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized;
}
