//! Newton's method with a steepest-descent fallback.
//!
//! The Newton direction `d = −H⁻¹·∇f` is only trusted when the Hessian can
//! be inverted and its inverse is positive-definite. Otherwise the iteration
//! falls back to `−∇f`. The choice is made explicit by [`NewtonDirection`]
//! so callers and tests can see which branch was taken.
//!
//! A Newton step is taken in full (`t = 1`, no line search); fallback steps
//! use halving backtracking from `t₀`.

use std::fmt;

use descentopt_core::{
    cost_function::CostFunction,
    differentiation::FiniteDifference,
    error::{OptimizerError, Result},
    line_search::{BacktrackingLineSearch, LineSearchParams},
    linalg,
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion},
    types::{Matrix, Point, Vector},
};
use log::warn;

use crate::driver::{run_descent, DescentStep, StepContext};

/// Why the Newton direction was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FallbackReason {
    /// The Hessian could not be inverted
    SingularHessian,
    /// The inverse Hessian is not positive-definite
    NotPositiveDefinite,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingularHessian => write!(f, "singular Hessian"),
            Self::NotPositiveDefinite => write!(f, "inverse Hessian is not positive-definite"),
        }
    }
}

/// Search direction chosen by [`select_newton_direction`].
#[derive(Debug, Clone, PartialEq)]
pub enum NewtonDirection {
    /// `−H⁻¹·∇f`
    NewtonStep { direction: Vector },
    /// `−∇f`, with the reason the Newton direction was rejected
    SteepestDescentFallback {
        direction: Vector,
        reason: FallbackReason,
    },
}

impl NewtonDirection {
    /// The search direction regardless of branch.
    pub fn direction(&self) -> &Vector {
        match self {
            Self::NewtonStep { direction } | Self::SteepestDescentFallback { direction, .. } => {
                direction
            }
        }
    }

    /// Consumes the choice and returns the direction.
    pub fn into_direction(self) -> Vector {
        match self {
            Self::NewtonStep { direction } | Self::SteepestDescentFallback { direction, .. } => {
                direction
            }
        }
    }

    /// Whether the Newton direction was accepted.
    pub fn is_newton_step(&self) -> bool {
        matches!(self, Self::NewtonStep { .. })
    }

    /// The fallback reason, if the Newton direction was rejected.
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::NewtonStep { .. } => None,
            Self::SteepestDescentFallback { reason, .. } => Some(*reason),
        }
    }
}

/// Chooses between the Newton direction and steepest descent.
///
/// # Errors
///
/// Returns `DimensionMismatch` if `hessian` is not an `n × n` matrix for a
/// gradient of length `n`. Singularity is not an error; it selects the
/// fallback branch.
pub fn select_newton_direction(hessian: &Matrix, gradient: &Vector) -> Result<NewtonDirection> {
    let n = gradient.len();
    if hessian.nrows() != n || hessian.ncols() != n {
        return Err(OptimizerError::dimension_mismatch(
            format!("{n}x{n} Hessian"),
            format!("{}x{} matrix", hessian.nrows(), hessian.ncols()),
        ));
    }

    let inverse = match linalg::inverse(hessian) {
        Ok(inverse) => inverse,
        Err(OptimizerError::SingularMatrix { .. }) => {
            return Ok(NewtonDirection::SteepestDescentFallback {
                direction: -gradient,
                reason: FallbackReason::SingularHessian,
            });
        }
        Err(e) => return Err(e),
    };

    if linalg::is_positive_definite(&inverse) {
        Ok(NewtonDirection::NewtonStep {
            direction: -(inverse * gradient),
        })
    } else {
        Ok(NewtonDirection::SteepestDescentFallback {
            direction: -gradient,
            reason: FallbackReason::NotPositiveDefinite,
        })
    }
}

/// Finite-difference Hessian at the current iterate followed by the
/// direction choice. Shared by both Newton variants.
pub(crate) fn newton_direction_at<C>(ctx: &StepContext<'_, C>, name: &str) -> Result<NewtonDirection>
where
    C: CostFunction + ?Sized,
{
    let hessian = ctx.differentiator.hessian(ctx.cost_fn, ctx.point)?;
    let choice = select_newton_direction(&hessian, ctx.gradient)?;
    if let Some(reason) = choice.fallback_reason() {
        warn!(
            "{} iteration {}: {}, falling back to steepest descent",
            name, ctx.iteration, reason
        );
    }
    Ok(choice)
}

/// Configuration for Newton's method.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonConfig {
    /// Backtracking parameters used on fallback steps
    pub line_search_params: LineSearchParams,
    /// Perturbation for finite-difference gradients and Hessians
    pub finite_difference_step: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            line_search_params: LineSearchParams::default(),
            finite_difference_step: FiniteDifference::DEFAULT_STEP,
        }
    }
}

impl NewtonConfig {
    /// Creates a new Newton configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial step size `t₀` of fallback backtracking.
    pub fn with_initial_step_size(mut self, step_size: f64) -> Self {
        self.line_search_params.initial_step_size = step_size;
        self
    }

    /// Sets the cap on step halvings per fallback step.
    pub fn with_max_halvings(mut self, max_halvings: usize) -> Self {
        self.line_search_params.max_halvings = max_halvings;
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

/// Newton's method.
#[derive(Debug)]
pub struct Newton {
    config: NewtonConfig,
    line_search: BacktrackingLineSearch,
}

impl Newton {
    /// Creates a new Newton optimizer with the given configuration.
    pub fn new(config: NewtonConfig) -> Self {
        Self {
            config,
            line_search: BacktrackingLineSearch::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }
}

impl Default for Newton {
    fn default() -> Self {
        Self::new(NewtonConfig::default())
    }
}

impl DescentStep for Newton {
    fn next_point<C>(&mut self, ctx: &StepContext<'_, C>) -> Result<Point>
    where
        C: CostFunction + ?Sized,
    {
        match newton_direction_at(ctx, "Newton")? {
            NewtonDirection::NewtonStep { direction } => Ok(ctx.point + direction),
            NewtonDirection::SteepestDescentFallback { direction, .. } => {
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
    }
}

impl Optimizer for Newton {
    fn name(&self) -> &str {
        "Newton"
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
