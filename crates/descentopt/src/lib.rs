//! DescentOpt - finite-difference descent methods for unconstrained minimization.
//!
//! This crate bundles [`descentopt_core`] and [`descentopt_optim`] behind a
//! single dependency and adds one free function per algorithm for callers
//! that only have an objective and a starting point.
//!
//! The free functions take any [`CostFunction`]. Wrap a closure with
//! [`FnCost::with_dimension`] so that a starting point of the wrong length is
//! rejected with [`OptimizerError::DimensionMismatch`] before the closure is
//! ever called.
//!
//! Every run stops on the first of:
//! - the finite-difference gradient norm dropping to `eps1` or below,
//! - two consecutive steps that both move less than `eps2` and change the
//!   objective by less than `eps2`,
//! - `max_iterations` completed iterations (not an error).
//!
//! # Example
//!
//! ```rust
//! use descentopt::prelude::*;
//!
//! let f = FnCost::with_dimension(2, |x: &Point| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2));
//! let result = descentopt::newton(&f, &dvector![0.0, 0.0], 1e-4, 1e-6, 1000, 1.0)?;
//!
//! assert!(result.converged);
//! assert!((result.point - dvector![1.0, 2.0]).norm() < 1e-3);
//! # Ok::<(), OptimizerError>(())
//! ```
//!
//! Callers needing the finite-difference step, the halving cap or an explicit
//! line search resolution use the optimizer types and their configs directly.

pub use descentopt_core;
pub use descentopt_optim;

pub use descentopt_core::{
    cost_function::{CostFunction, FnCost},
    error::{OptimizerError, Result},
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion, TerminationReason},
    types::Point,
};

pub use descentopt_optim::{
    FastGradientDescent, FastGradientDescentConfig, FletcherReeves, FletcherReevesConfig,
    GradientDescent, GradientDescentConfig, Newton, NewtonConfig, NewtonRaphson,
    NewtonRaphsonConfig,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use descentopt_core::prelude::*;
    pub use descentopt_optim::{
        select_newton_direction, FallbackReason, FastGradientDescent, FastGradientDescentConfig,
        FletcherReeves, FletcherReevesConfig, GradientDescent, GradientDescentConfig, Newton,
        NewtonConfig, NewtonDirection, NewtonRaphson, NewtonRaphsonConfig,
    };
    pub use nalgebra::{dmatrix, dvector};
}

fn criterion(eps1: f64, eps2: f64, max_iterations: usize) -> StoppingCriterion {
    StoppingCriterion::new()
        .with_gradient_tolerance(eps1)
        .with_step_tolerance(eps2)
        .with_max_iterations(max_iterations)
}

/// Gradient descent with halving backtracking from `t0`.
pub fn gradient_descent<C>(
    cost_fn: &C,
    x0: &Point,
    eps1: f64,
    eps2: f64,
    max_iterations: usize,
    t0: f64,
) -> Result<OptimizationResult>
where
    C: CostFunction + ?Sized,
{
    GradientDescent::new(GradientDescentConfig::new().with_initial_step_size(t0)).optimize(
        cost_fn,
        x0,
        &criterion(eps1, eps2, max_iterations),
    )
}

/// Steepest descent with an exact line search on a grid of spacing `eps1`.
pub fn fast_gradient_descent<C>(
    cost_fn: &C,
    x0: &Point,
    eps1: f64,
    eps2: f64,
    max_iterations: usize,
) -> Result<OptimizationResult>
where
    C: CostFunction + ?Sized,
{
    FastGradientDescent::default().optimize(cost_fn, x0, &criterion(eps1, eps2, max_iterations))
}

/// Fletcher–Reeves conjugate gradient with halving backtracking from `t0`.
pub fn fletcher_reeves<C>(
    cost_fn: &C,
    x0: &Point,
    eps1: f64,
    eps2: f64,
    max_iterations: usize,
    t0: f64,
) -> Result<OptimizationResult>
where
    C: CostFunction + ?Sized,
{
    FletcherReeves::new(FletcherReevesConfig::new().with_initial_step_size(t0)).optimize(
        cost_fn,
        x0,
        &criterion(eps1, eps2, max_iterations),
    )
}

/// Newton's method; `t0` only seeds backtracking on steepest-descent fallbacks.
pub fn newton<C>(
    cost_fn: &C,
    x0: &Point,
    eps1: f64,
    eps2: f64,
    max_iterations: usize,
    t0: f64,
) -> Result<OptimizationResult>
where
    C: CostFunction + ?Sized,
{
    Newton::new(NewtonConfig::new().with_initial_step_size(t0)).optimize(
        cost_fn,
        x0,
        &criterion(eps1, eps2, max_iterations),
    )
}

/// Newton–Raphson with an exact line search on a grid of spacing `eps1`.
pub fn newton_raphson<C>(
    cost_fn: &C,
    x0: &Point,
    eps1: f64,
    eps2: f64,
    max_iterations: usize,
) -> Result<OptimizationResult>
where
    C: CostFunction + ?Sized,
{
    NewtonRaphson::default().optimize(cost_fn, x0, &criterion(eps1, eps2, max_iterations))
}

/// Uniform grid minimizer of a scalar function on `[a, b]`.
///
/// See [`descentopt_core::line_search::uniform_search`].
pub fn uniform_search<F>(f: F, a: f64, b: f64, resolution: f64) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    descentopt_core::line_search::uniform_search(f, a, b, resolution)
}
