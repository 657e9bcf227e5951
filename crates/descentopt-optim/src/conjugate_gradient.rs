//! Fletcher–Reeves nonlinear conjugate gradient.
//!
//! The first direction is the steepest descent direction. Later directions
//! mix in the previous one:
//!
//! ```text
//! d_k = −g_k + β_k·d_{k−1},    β_k = ‖g_k‖² / ‖g_{k−1}‖²
//! ```
//!
//! and the step along `d_k` is found by halving backtracking from `t₀`.
//!
//! # Restarts
//!
//! The direction falls back to `−g_k` (β = 0) when the previous gradient
//! vanished, and, unless disabled, when `d_k` is not a descent direction.
//!
//! # References
//!
//! - Fletcher & Reeves, "Function minimization by conjugate gradients" (1964)
//! - Nocedal & Wright, "Numerical Optimization", §5.2

use descentopt_core::{
    cost_function::CostFunction,
    differentiation::FiniteDifference,
    error::{OptimizerError, Result},
    line_search::{BacktrackingLineSearch, LineSearchParams},
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion},
    types::{Point, Vector},
};
use log::trace;

use crate::driver::{run_descent, DescentStep, StepContext};

/// Configuration for the Fletcher–Reeves optimizer.
///
/// With the default `restart_on_ascent = true` the iteration is not plain
/// Fletcher–Reeves: any `d_k` with `g_kᵀd_k ≥ 0` is replaced by `−g_k`.
/// Use [`with_restart_on_ascent(false)`](Self::with_restart_on_ascent) for
/// the unmodified `d_k = −g_k + β_k·d_{k−1}` at every `k > 0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FletcherReevesConfig {
    /// Backtracking parameters (`t₀`, reduction factor, halving cap)
    pub line_search_params: LineSearchParams,
    /// Restart with `−g_k` whenever the conjugate direction points uphill
    /// (default `true`)
    pub restart_on_ascent: bool,
    /// Perturbation for finite-difference gradients
    pub finite_difference_step: f64,
}

impl Default for FletcherReevesConfig {
    fn default() -> Self {
        Self {
            line_search_params: LineSearchParams::default(),
            restart_on_ascent: true,
            finite_difference_step: FiniteDifference::DEFAULT_STEP,
        }
    }
}

impl FletcherReevesConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial step size `t₀` of every backtracking search.
    pub fn with_initial_step_size(mut self, step_size: f64) -> Self {
        self.line_search_params.initial_step_size = step_size;
        self
    }

    /// Sets the cap on step halvings per iteration.
    pub fn with_max_halvings(mut self, max_halvings: usize) -> Self {
        self.line_search_params.max_halvings = max_halvings;
        self
    }

    /// Sets the line search parameters.
    pub fn with_line_search(mut self, params: LineSearchParams) -> Self {
        self.line_search_params = params;
        self
    }

    /// Enables or disables the restart on non-descent directions.
    pub fn with_restart_on_ascent(mut self, restart: bool) -> Self {
        self.restart_on_ascent = restart;
        self
    }

    /// Sets the finite-difference perturbation.
    pub fn with_finite_difference_step(mut self, step: f64) -> Self {
        self.finite_difference_step = step;
        self
    }

    /// Validates the line search and differentiation parameters.
    pub fn validate(&self) -> Result<()> {
        self.line_search_params.validate()?;
        OptimizerError::require_positive("finite_difference_step", self.finite_difference_step)
    }
}

/// Computes the Fletcher–Reeves coefficient `‖g‖² / ‖g_prev‖²`.
///
/// Returns 0 when the previous gradient is zero, which restarts the method.
pub fn fletcher_reeves_beta(gradient: &Vector, previous_gradient: &Vector) -> f64 {
    let denominator = previous_gradient.norm_squared();
    if denominator > 0.0 {
        gradient.norm_squared() / denominator
    } else {
        0.0
    }
}

/// Per-run state: the previous gradient and direction.
#[derive(Debug)]
struct FletcherReevesStep<'a> {
    config: &'a FletcherReevesConfig,
    line_search: BacktrackingLineSearch,
    previous: Option<(Vector, Vector)>,
}

impl FletcherReevesStep<'_> {
    fn direction(&self, gradient: &Vector) -> Vector {
        let Some((previous_gradient, previous_direction)) = &self.previous else {
            return -gradient;
        };

        let beta = fletcher_reeves_beta(gradient, previous_gradient);
        let direction = previous_direction * beta - gradient;

        if self.config.restart_on_ascent && gradient.dot(&direction) >= 0.0 {
            trace!("Fletcher-Reeves: restarting (beta = {:e})", beta);
            -gradient
        } else {
            direction
        }
    }
}

impl DescentStep for FletcherReevesStep<'_> {
    fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
    where
        C: CostFunction + ?Sized,
    {
        let direction = self.direction(ctx.gradient);
        let result = self.line_search.search(
            ctx.cost_fn,
            ctx.point,
            ctx.value,
            &direction,
            &self.config.line_search_params,
        )?;
        self.previous = Some((ctx.gradient.clone(), direction));
        Ok(result.new_point)
    }
}

/// Fletcher–Reeves conjugate gradient optimizer.
#[derive(Debug, Default)]
pub struct FletcherReeves {
    config: FletcherReevesConfig,
}

impl FletcherReeves {
    /// Creates a new optimizer with the given configuration.
    pub fn new(config: FletcherReevesConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FletcherReevesConfig {
        &self.config
    }
}

impl Optimizer for FletcherReeves {
    fn name(&self) -> &str {
        "Fletcher-Reeves"
    }

    fn optimize<C>(
        &mut self,
        cost_fn: &C,
        initial_point: &Point,
        stopping_criterion: &StoppingCriterion,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
    {
        self.config.validate()?;
        let differentiator = FiniteDifference::new(self.config.finite_difference_step)?;
        let mut stepper = FletcherReevesStep {
            config: &self.config,
            line_search: BacktrackingLineSearch::new(),
            previous: None,
        };

        run_descent(
            self.name(),
            cost_fn,
            initial_point,
            stopping_criterion,
            &differentiator,
            &mut stepper,
        )
    }
}
