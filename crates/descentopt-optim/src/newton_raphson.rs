//! Newton–Raphson: the Newton direction with an exact grid line search.
//!
//! Directions come from [`select_newton_direction`](crate::newton::select_newton_direction),
//! so singular or indefinite Hessians fall back to `−∇f` exactly as in
//! [`Newton`](crate::newton::Newton). The step length along either direction
//! is the uniform-grid minimizer of `t ↦ f(x + t·d)` on `[0, 1]`, rounded to
//! four decimals.

use descentopt_core::{
    cost_function::CostFunction,
    differentiation::FiniteDifference,
    error::{OptimizerError, Result},
    line_search::UniformLineSearch,
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion},
    types::Point,
};

use crate::driver::{run_descent, DescentStep, StepContext};
use crate::newton::newton_direction_at;

/// Configuration for Newton–Raphson.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonRaphsonConfig {
    /// Grid spacing on `[0, 1]`; `None` uses the gradient tolerance
    pub search_resolution: Option<f64>,
    /// Perturbation for finite-difference gradients and Hessians
    pub finite_difference_step: f64,
}

impl Default for NewtonRaphsonConfig {
    fn default() -> Self {
        Self {
            search_resolution: None,
            finite_difference_step: FiniteDifference::DEFAULT_STEP,
        }
    }
}

impl NewtonRaphsonConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit grid spacing for the line search.
    pub fn with_search_resolution(mut self, resolution: f64) -> Self {
        self.search_resolution = Some(resolution);
        self
    }

    /// Sets the finite-difference perturbation.
    pub fn with_finite_difference_step(mut self, step: f64) -> Self {
        self.finite_difference_step = step;
        self
    }

    /// Validates the explicit grid spacing, if any, and the perturbation.
    pub fn validate(&self) -> Result<()> {
        if let Some(resolution) = self.search_resolution {
            OptimizerError::require_positive("search_resolution", resolution)?;
        }
        OptimizerError::require_positive("finite_difference_step", self.finite_difference_step)
    }
}

#[derive(Debug)]
struct NewtonRaphsonStep {
    line_search: UniformLineSearch,
}

impl DescentStep for NewtonRaphsonStep {
    fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
    where
        C: CostFunction + ?Sized,
    {
        let direction = newton_direction_at(ctx, "Newton-Raphson")?.into_direction();
        let result = self.line_search.search(ctx.cost_fn, ctx.point, &direction)?;
        Ok(result.new_point)
    }
}

/// Newton–Raphson optimizer.
#[derive(Debug, Default)]
pub struct NewtonRaphson {
    config: NewtonRaphsonConfig,
}

impl NewtonRaphson {
    /// Creates a new optimizer with the given configuration.
    pub fn new(config: NewtonRaphsonConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NewtonRaphsonConfig {
        &self.config
    }
}

impl Optimizer for NewtonRaphson {
    fn name(&self) -> &str {
        "Newton-Raphson"
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
        stopping_criterion.validate()?;
        let resolution = self
            .config
            .search_resolution
            .unwrap_or(stopping_criterion.gradient_tolerance);
        let mut stepper = NewtonRaphsonStep {
            line_search: UniformLineSearch::new(resolution)?,
        };
        let differentiator = FiniteDifference::new(self.config.finite_difference_step)?;

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
