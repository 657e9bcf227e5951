//! DescentOpt Optimization - descent algorithms for unconstrained minimization.
//!
//! Every optimizer here minimizes a black-box objective `f: ℝⁿ → ℝ` using
//! finite-difference derivatives and shares one outer loop ([`driver`]):
//! a gradient-norm test, a step, and the double-consecutive convergence
//! latch.
//!
//! # Available Optimizers
//!
//! - **Gradient Descent**: steepest descent with halving backtracking
//! - **Fast Gradient Descent**: steepest descent with an exact grid line search
//! - **Fletcher–Reeves**: nonlinear conjugate gradient with backtracking
//! - **Newton**: inverse-Hessian direction, full steps, steepest-descent fallback
//! - **Newton–Raphson**: Newton direction with an exact grid line search
//!
//! # Examples
//!
//! ```rust
//! use descentopt_optim::{GradientDescent, GradientDescentConfig};
//! use descentopt_core::prelude::*;
//! use nalgebra::dvector;
//!
//! let cost_fn = FnCost::new(|x: &Point| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2));
//!
//! let mut optimizer = GradientDescent::new(
//!     GradientDescentConfig::new().with_initial_step_size(1.0),
//! );
//!
//! let stopping_criterion = StoppingCriterion::new()
//!     .with_max_iterations(1000)
//!     .with_gradient_tolerance(1e-4)
//!     .with_step_tolerance(1e-6);
//!
//! let result = optimizer.optimize(&cost_fn, &dvector![0.0, 0.0], &stopping_criterion)?;
//! assert!(result.converged);
//! # Ok::<(), descentopt_core::OptimizerError>(())
//! ```

pub mod conjugate_gradient;
pub mod driver;
pub mod fast_gradient_descent;
pub mod gradient_descent;
pub mod newton;
pub mod newton_raphson;

// Re-export main optimizers for convenience
pub use conjugate_gradient::{fletcher_reeves_beta, FletcherReeves, FletcherReevesConfig};
pub use driver::{run_descent, DescentStep, StepContext};
pub use fast_gradient_descent::{FastGradientDescent, FastGradientDescentConfig};
pub use gradient_descent::{GradientDescent, GradientDescentConfig};
pub use newton::{select_newton_direction, FallbackReason, Newton, NewtonConfig, NewtonDirection};
pub use newton_raphson::{NewtonRaphson, NewtonRaphsonConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use descentopt_core::optimizer::Optimizer;

    #[test]
    fn test_exports() {
        assert_eq!(GradientDescent::default().name(), "Gradient Descent");
        assert_eq!(FastGradientDescent::default().name(), "Fast Gradient Descent");
        assert_eq!(FletcherReeves::default().name(), "Fletcher-Reeves");
        assert_eq!(Newton::default().name(), "Newton");
        assert_eq!(NewtonRaphson::default().name(), "Newton-Raphson");
    }
}
