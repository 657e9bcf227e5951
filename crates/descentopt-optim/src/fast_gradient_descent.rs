//! Steepest descent with an exact (grid) line search.
//!
//! The step length is the minimizer of `φ(t) = f(x_k − t·∇f(x_k))` over a
//! uniform grid on `[0, 1]`, rounded to four decimals. The grid spacing
//! defaults to the gradient tolerance `ε₁` of the run, so a run with
//! `ε₁ = 1e-4` evaluates `φ` about ten thousand times per iteration.

use descentopt_core::{
    cost_function::CostFunction,
    differentiation::FiniteDifference,
    error::{OptimizerError, Result},
    line_search::UniformLineSearch,
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion},
    types::Point,
};

use crate::driver::{run_descent, DescentStep, StepContext};

/// Configuration for fast gradient descent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FastGradientDescentConfig {
    /// Grid spacing on `[0, 1]`; `None` uses the gradient tolerance
    pub search_resolution: Option<f64>,
    /// Perturbation for finite-difference gradients
    pub finite_difference_step: f64,
}

impl Default for FastGradientDescentConfig {
    fn default() -> Self {
        Self {
            search_resolution: None,
            finite_difference_step: FiniteDifference::DEFAULT_STEP,
        }
    }
}

impl FastGradientDescentConfig {
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

/// Grid line search along `−∇f`, built per run.
#[derive(Debug)]
struct FastGradientStep {
    line_search: UniformLineSearch,
}

impl DescentStep for FastGradientStep {
    fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
    where
        C: CostFunction + ?Sized,
    {
        let direction = -ctx.gradient;
        let result = self.line_search.search(ctx.cost_fn, ctx.point, &direction)?;
        Ok(result.new_point)
    }
}

/// Fast gradient descent optimizer.
#[derive(Debug, Default)]
pub struct FastGradientDescent {
    config: FastGradientDescentConfig,
}

impl FastGradientDescent {
    /// Creates a new optimizer with the given configuration.
    pub fn new(config: FastGradientDescentConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FastGradientDescentConfig {
        &self.config
    }
}

impl Optimizer for FastGradientDescent {
    fn name(&self) -> &str {
        "Fast Gradient Descent"
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
        let mut stepper = FastGradientStep {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use descentopt_core::cost_function::{FnCost, QuadraticCost};
    use descentopt_core::optimizer::TerminationReason;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn test_fast_gradient_descent_on_shifted_bowl() {
        let cost_fn = FnCost::new(|x: &Point| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2));
        let criterion = StoppingCriterion::new()
            .with_gradient_tolerance(1e-4)
            .with_step_tolerance(1e-6)
            .with_max_iterations(1000);

        let result = FastGradientDescent::default()
            .optimize(&cost_fn, &dvector![0.0, 0.0], &criterion)
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.point, dvector![1.0, 2.0], epsilon = 1e-3);
    }

    #[test]
    fn test_exact_step_on_isotropic_bowl() {
        // On ‖x‖² the best step along −∇f is t = 1/2, which lies on the grid.
        let cost_fn = QuadraticCost::simple(3);
        let criterion = StoppingCriterion::new().with_max_iterations(1);

        let result = FastGradientDescent::new(
            FastGradientDescentConfig::new().with_search_resolution(1e-2),
        )
        .optimize(&cost_fn, &dvector![1.0, -2.0, 0.5], &criterion)
        .unwrap();

        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.point, Point::zeros(3), epsilon = 1e-4);
    }

    #[test]
    fn test_fast_gradient_descent_on_quadratic() {
        let cost_fn =
            QuadraticCost::new(dmatrix![2.0, 0.5; 0.5, 1.0], dvector![1.0, -1.0], 0.0).unwrap();
        let criterion = StoppingCriterion::new()
            .with_gradient_tolerance(1e-3)
            .with_step_tolerance(1e-8)
            .with_max_iterations(500);

        let result = FastGradientDescent::default()
            .optimize(&cost_fn, &dvector![2.0, 2.0], &criterion)
            .unwrap();

        assert_ne!(result.termination_reason, TerminationReason::MaxIterations);
        assert_relative_eq!(result.point, cost_fn.minimizer().unwrap(), epsilon = 1e-2);
    }

    #[test]
    fn test_invalid_resolution() {
        let cost_fn = QuadraticCost::simple(2);
        let err = FastGradientDescent::new(
            FastGradientDescentConfig::new().with_search_resolution(-1.0),
        )
        .optimize(&cost_fn, &dvector![1.0, 1.0], &StoppingCriterion::new())
        .unwrap_err();

        assert!(matches!(
            err,
            OptimizerError::InvalidConfiguration { ref parameter, .. } if parameter == "search_resolution"
        ));
    }
}
