//! Gradient descent with halving backtracking.
//!
//! Each iteration moves along the negative gradient:
//!
//! ```text
//! x_{k+1} = x_k − t·∇f(x_k)
//! ```
//!
//! where `t` starts at `t₀` and is halved until `f(x_{k+1}) ≤ f(x_k)`.

use descentopt_core::{
    cost_function::CostFunction,
    differentiation::FiniteDifference,
    error::{OptimizerError, Result},
    line_search::{BacktrackingLineSearch, LineSearchParams},
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion},
    types::Point,
};

use crate::driver::{run_descent, DescentStep, StepContext};

/// Configuration for gradient descent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientDescentConfig {
    /// Backtracking parameters (`t₀`, reduction factor, halving cap)
    pub line_search_params: LineSearchParams,
    /// Perturbation for finite-difference gradients
    pub finite_difference_step: f64,
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        Self {
            line_search_params: LineSearchParams::default(),
            finite_difference_step: FiniteDifference::DEFAULT_STEP,
        }
    }
}

impl GradientDescentConfig {
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

/// Gradient descent optimizer.
#[derive(Debug)]
pub struct GradientDescent {
    config: GradientDescentConfig,
    line_search: BacktrackingLineSearch,
}

impl GradientDescent {
    /// Creates a new gradient descent optimizer with the given configuration.
    pub fn new(config: GradientDescentConfig) -> Self {
        Self {
            config,
            line_search: BacktrackingLineSearch::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GradientDescentConfig {
        &self.config
    }
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self::new(GradientDescentConfig::default())
    }
}

impl DescentStep for GradientDescent {
    fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
    where
        C: CostFunction + ?Sized,
    {
        let direction = -ctx.gradient;
        let result = self.line_search.search(
            ctx.cost_fn,
            ctx.point,
            ctx.value,
            &direction,
            &self.config.line_search_params,
        )?;
        Ok(result.new_point)
    }
}

impl Optimizer for GradientDescent {
    fn name(&self) -> &str {
        "Gradient Descent"
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
        let name = self.name().to_owned();
        run_descent(
            &name,
            cost_fn,
            initial_point,
            stopping_criterion,
            &differentiator,
            self,
        )
    }
}
