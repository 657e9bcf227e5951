//! Outer loop shared by every descent algorithm.
//!
//! Algorithms only decide how to move from the current point; the driver
//! owns the gradient test, the convergence latch, the iteration budget and
//! the bookkeeping that ends up in [`OptimizationResult`].

use descentopt_core::{
    cost_function::{validate_initial_point, CostFunction, CountingCostFunction},
    differentiation::FiniteDifference,
    error::{OptimizerError, Result},
    optimizer::{ConvergenceChecker, OptimizationResult, StoppingCriterion, TerminationReason},
    types::{Point, Vector},
};
use log::{debug, warn};
use std::time::Instant;

/// Everything an algorithm sees when producing the next iterate.
#[derive(Debug)]
pub struct StepContext<'a, C: ?Sized> {
    /// The objective, wrapped for evaluation counting
    pub cost_fn: &'a C,
    /// Current iterate `x_k`
    pub point: &'a Point,
    /// `f(x_k)`
    pub value: f64,
    /// Finite-difference gradient at `x_k`
    pub gradient: &'a Vector,
    /// Iteration index `k`, starting at 0
    pub iteration: usize,
    /// Stopping criterion of the run
    pub criterion: &'a StoppingCriterion,
    /// Differentiator configured for the run
    pub differentiator: &'a FiniteDifference,
}

/// One iteration of a descent algorithm: choose a direction and a step.
pub trait DescentStep {
    /// Returns the next iterate `x_{k+1}`.
    fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
    where
        C: CostFunction + ?Sized;
}

/// Runs the shared descent loop with `stepper` choosing each move.
pub fn run_descent<C, S>(
    name: &str,
    cost_fn: &C,
    initial_point: &Point,
    criterion: &StoppingCriterion,
    differentiator: &FiniteDifference,
    stepper: &mut S,
) -> Result<OptimizationResult>
where
    C: CostFunction + ?Sized,
    S: DescentStep,
{
    criterion.validate()?;
    validate_initial_point(cost_fn, initial_point)?;

    let start = Instant::now();
    let counted = CountingCostFunction::new(cost_fn);

    let mut point = initial_point.clone();
    let mut value = counted.cost(&point)?;
    if !value.is_finite() {
        return Err(OptimizerError::numerical_error(format!(
            "objective is {value} at the initial point"
        )));
    }

    let mut checker = ConvergenceChecker::new(criterion.step_tolerance);
    let mut gradient_norm = None;
    let mut iteration = 0;

    let reason = loop {
        if iteration >= criterion.max_iterations {
            break TerminationReason::MaxIterations;
        }

        let gradient = differentiator.gradient(&counted, &point)?;
        let norm = gradient.norm();
        gradient_norm = Some(norm);
        if norm <= criterion.gradient_tolerance {
            break TerminationReason::GradientTolerance;
        }

        let ctx = StepContext {
            cost_fn: &counted,
            point: &point,
            value,
            gradient: &gradient,
            iteration,
            criterion,
            differentiator,
        };
        let next = stepper.next_point(&ctx)?;
        let next_value = counted.cost(&next)?;

        debug!(
            "{} iteration {}: f = {:e}, |grad| = {:e}, |step| = {:e}",
            name,
            iteration,
            next_value,
            norm,
            (&next - &point).norm()
        );

        let converged = checker.update(&next, &point, next_value, value);
        point = next;
        value = next_value;
        if converged {
            break TerminationReason::Converged;
        }
        iteration += 1;
    };

    if reason == TerminationReason::MaxIterations && criterion.max_iterations > 0 {
        warn!(
            "{} stopped after {} iterations without converging (f = {:e})",
            name, iteration, value
        );
    }

    Ok(
        OptimizationResult::new(point, value, iteration, start.elapsed(), reason)
            .with_gradient_norm(gradient_norm)
            .with_function_evaluations(counted.count()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use descentopt_core::cost_function::FnCost;
    use nalgebra::dvector;

    /// Replays a fixed sequence of iterates.
    struct Scripted {
        points: Vec<Point>,
        calls: usize,
    }

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Self {
                points: values.iter().map(|v| dvector![*v]).collect(),
                calls: 0,
            }
        }
    }

    impl DescentStep for Scripted {
        fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
        where
            C: CostFunction + ?Sized,
        {
            assert_eq!(ctx.iteration, self.calls);
            let next = self.points[self.calls.min(self.points.len() - 1)].clone();
            self.calls += 1;
            Ok(next)
        }
    }

    fn linear() -> FnCost<impl Fn(&Point) -> f64> {
        // Constant slope, so the gradient test never fires.
        FnCost::new(|x: &Point| x[0])
    }

    fn run(stepper: &mut Scripted, max_iterations: usize) -> OptimizationResult {
        let criterion = StoppingCriterion::new()
            .with_gradient_tolerance(1e-4)
            .with_step_tolerance(1e-6)
            .with_max_iterations(max_iterations);
        run_descent(
            "scripted",
            &linear(),
            &dvector![0.0],
            &criterion,
            &FiniteDifference::default(),
            stepper,
        )
        .unwrap()
    }

    #[test]
    fn test_single_small_step_does_not_converge() {
        // large, small, large, small, small
        let mut stepper = Scripted::new(&[1.0, 1.0, 2.0, 2.0, 2.0]);
        let result = run(&mut stepper, 100);

        assert_eq!(result.termination_reason, TerminationReason::Converged);
        assert_eq!(stepper.calls, 5);
        assert_eq!(result.iterations, 4);
        assert_eq!(result.point, dvector![2.0]);
    }

    #[test]
    fn test_latch_resets_on_larger_step() {
        // small, larger, small, ... never two small steps in a row
        let mut stepper = Scripted::new(&[0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0]);
        let result = run(&mut stepper, 7);

        assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
        assert_eq!(result.iterations, 7);
        assert_eq!(result.point, dvector![3.0]);
        assert!(!result.converged);
    }

    #[test]
    fn test_converged_gradient_norm_is_from_previous_iterate() {
        let cost_fn = FnCost::new(|x: &Point| x[0] * x[0]);
        let criterion = StoppingCriterion::new()
            .with_step_tolerance(0.5)
            .with_max_iterations(100);
        // large, small, small
        let mut stepper = Scripted::new(&[1.0, 1.2, 1.3]);

        let result = run_descent(
            "scripted",
            &cost_fn,
            &dvector![3.0],
            &criterion,
            &FiniteDifference::default(),
            &mut stepper,
        )
        .unwrap();

        assert_eq!(result.termination_reason, TerminationReason::Converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.point, dvector![1.3]);

        let previous = FiniteDifference::default()
            .gradient(&cost_fn, &dvector![1.2])
            .unwrap()
            .norm();
        assert_eq!(result.gradient_norm, Some(previous));
        assert_relative_eq!(previous, 2.4, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_budget_returns_initial_point() {
        let mut stepper = Scripted::new(&[5.0]);
        let result = run(&mut stepper, 0);

        assert_eq!(result.iterations, 0);
        assert_eq!(result.point, dvector![0.0]);
        assert_eq!(result.gradient_norm, None);
        assert_eq!(stepper.calls, 0);
    }

    #[test]
    fn test_gradient_tolerance_stops_before_stepping() {
        let flat = FnCost::new(|_: &Point| 3.0);
        let mut stepper = Scripted::new(&[1.0]);
        let result = run_descent(
            "scripted",
            &flat,
            &dvector![0.0, 0.0],
            &StoppingCriterion::new(),
            &FiniteDifference::default(),
            &mut stepper,
        )
        .unwrap();

        assert_eq!(result.termination_reason, TerminationReason::GradientTolerance);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.gradient_norm, Some(0.0));
        assert_eq!(stepper.calls, 0);
        // f(x0) plus 2n gradient evaluations
        assert_eq!(result.function_evaluations, 1 + 4);
    }

    #[test]
    fn test_rejects_non_finite_start() {
        let cost_fn = FnCost::new(|x: &Point| 1.0 / x[0]);
        let mut stepper = Scripted::new(&[1.0]);
        let err = run_descent(
            "scripted",
            &cost_fn,
            &dvector![0.0],
            &StoppingCriterion::new(),
            &FiniteDifference::default(),
            &mut stepper,
        )
        .unwrap_err();
        assert!(matches!(err, OptimizerError::NumericalError { .. }));
    }

    #[test]
    fn test_rejects_dimension_mismatch_before_evaluating() {
        let calls = std::cell::Cell::new(0);
        let cost_fn = FnCost::with_dimension(2, |x: &Point| {
            calls.set(calls.get() + 1);
            x.norm_squared()
        });
        let mut stepper = Scripted::new(&[1.0]);
        let err = run_descent(
            "scripted",
            &cost_fn,
            &dvector![0.0, 0.0, 0.0],
            &StoppingCriterion::new(),
            &FiniteDifference::default(),
            &mut stepper,
        )
        .unwrap_err();

        assert!(matches!(err, OptimizerError::DimensionMismatch { .. }));
        assert_eq!(calls.get(), 0);
    }
}
