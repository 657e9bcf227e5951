//! Line search algorithms.
//!
//! Given a point `x`, a search direction `d` and an objective `f`, a line
//! search picks a step length `t` and returns the new point `x + t·d`.
//!
//! # Algorithm Variants
//!
//! ## Backtracking (halving)
//! Start from `t₀` and multiply by `ρ` (one half by default) until the
//! objective does not increase: `f(x + t·d) ≤ f(x)`. There is no Armijo
//! slope term, only plain monotone decrease. The number of reductions is
//! capped; exhausting the cap is reported as
//! [`OptimizerError::LineSearchFailed`].
//!
//! ## Uniform grid ("exact") search
//! Evaluate `φ(t) = f(x + t·d)` on a uniform grid over `[0, 1]` and keep the
//! best grid point, rounded to four decimals. The grid itself is exposed as
//! [`uniform_search`] for any one-dimensional function.
//!
//! # Examples
//!
//! ```rust
//! use descentopt_core::line_search::uniform_search;
//!
//! let t = uniform_search(|t| (t - 0.3) * (t - 0.3), 0.0, 1.0, 1e-3)?;
//! assert!((t - 0.3).abs() <= 1e-3);
//! # Ok::<(), descentopt_core::error::OptimizerError>(())
//! ```

use crate::core::{
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    types::{constants, round_to_decimals, Point, Vector},
};
use log::trace;

/// Result of a line search.
#[derive(Debug, Clone)]
pub struct LineSearchResult {
    /// The accepted step size
    pub step_size: f64,

    /// The new point `x + t·d`
    pub new_point: Point,

    /// The objective value at the new point
    pub new_value: f64,

    /// Number of objective evaluations performed
    pub function_evals: usize,
}

/// Parameters for backtracking line search.
///
/// # Usage
///
/// ```rust
/// # use descentopt_core::line_search::LineSearchParams;
/// let params = LineSearchParams::default()
///     .with_initial_step_size(2.0)
///     .with_max_halvings(30);
/// params.validate()?;
/// # Ok::<(), descentopt_core::error::OptimizerError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSearchParams {
    /// Initial step size `t₀`
    pub initial_step_size: f64,

    /// Reduction factor `ρ ∈ (0, 1)` applied after each rejected trial
    pub rho: f64,

    /// Maximum number of reductions before declaring failure
    pub max_halvings: usize,
}

impl Default for LineSearchParams {
    fn default() -> Self {
        Self {
            initial_step_size: constants::DEFAULT_INITIAL_STEP_SIZE,
            rho: constants::DEFAULT_BACKTRACKING_FACTOR,
            max_halvings: constants::DEFAULT_MAX_HALVINGS,
        }
    }
}

impl LineSearchParams {
    /// Sets the initial step size `t₀`.
    pub fn with_initial_step_size(mut self, step_size: f64) -> Self {
        self.initial_step_size = step_size;
        self
    }

    /// Sets the reduction factor.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Sets the cap on step reductions.
    pub fn with_max_halvings(mut self, max_halvings: usize) -> Self {
        self.max_halvings = max_halvings;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `t₀` is not positive or `ρ ∉ (0, 1)`.
    pub fn validate(&self) -> Result<()> {
        OptimizerError::require_positive("initial_step_size", self.initial_step_size)?;
        if !(self.rho > 0.0 && self.rho < 1.0) {
            return Err(OptimizerError::invalid_configuration(
                "backtracking factor must lie in (0, 1)",
                "rho",
                self.rho.to_string(),
            ));
        }
        Ok(())
    }
}

/// Backtracking line search on plain monotone decrease.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingLineSearch;

impl BacktrackingLineSearch {
    /// Creates a new backtracking line search.
    pub fn new() -> Self {
        Self
    }

    /// Shrinks the step from `t₀` until `f(x + t·d) ≤ f(x)`.
    ///
    /// A non-finite trial value never counts as a decrease.
    ///
    /// # Errors
    ///
    /// Returns `LineSearchFailed` once `max_halvings` reductions have been
    /// tried without an acceptable step.
    pub fn search<C>(
        &self,
        cost_fn: &C,
        point: &Point,
        value: f64,
        direction: &Vector,
        params: &LineSearchParams,
    ) -> Result<LineSearchResult>
    where
        C: CostFunction + ?Sized,
    {
        params.validate()?;

        let mut step_size = params.initial_step_size;
        let mut function_evals = 0;
        for halvings in 0..=params.max_halvings {
            let new_point = point + direction * step_size;
            let new_value = cost_fn.cost(&new_point)?;
            function_evals += 1;
            trace!(
                "backtracking trial {}: t = {:e}, f = {:e} (f0 = {:e})",
                halvings,
                step_size,
                new_value,
                value
            );

            if new_value <= value {
                return Ok(LineSearchResult {
                    step_size,
                    new_point,
                    new_value,
                    function_evals,
                });
            }

            if halvings < params.max_halvings {
                step_size *= params.rho;
            }
        }

        Err(OptimizerError::line_search_failed(
            "objective did not decrease along the search direction",
            params.max_halvings,
            step_size,
            value,
        ))
    }
}

/// Uniform grid minimizer on `[a, b]`.
///
/// The interval is split into `n = (b − a) / resolution` steps and `f` is
/// evaluated at `a` and at `a + i·(b − a)/n` for `i = 1, …, ⌊n⌋`. The abscissa
/// of the smallest value is returned; ties keep the first occurrence. There
/// is no refinement around the minimum.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the bounds are not finite, `b < a`, or
/// `resolution` is not positive.
pub fn uniform_search<F>(mut f: F, a: f64, b: f64, resolution: f64) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    try_uniform_search(|t| Ok(f(t)), a, b, resolution)
}

/// Fallible variant of [`uniform_search`] for objectives that return `Result`.
pub fn try_uniform_search<F>(mut f: F, a: f64, b: f64, resolution: f64) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    OptimizerError::require_positive("resolution", resolution)?;
    if !a.is_finite() || !b.is_finite() || b < a {
        return Err(OptimizerError::invalid_configuration(
            "interval bounds must be finite with a <= b",
            "interval",
            format!("[{a}, {b}]"),
        ));
    }

    let n = (b - a) / resolution;
    let mut min_x = a;
    let mut min_y = f(a)?;

    let mut i = 1.0;
    while i <= n {
        let x = a + i * (b - a) / n;
        let y = f(x)?;
        if min_y > y {
            min_y = y;
            min_x = x;
        }
        i += 1.0;
    }

    Ok(min_x)
}

/// Exact step selection by uniform search of `t ↦ f(x + t·d)` on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformLineSearch {
    resolution: f64,
}

impl UniformLineSearch {
    /// Creates a search with grid spacing `resolution` on `[0, 1]`.
    pub fn new(resolution: f64) -> Result<Self> {
        OptimizerError::require_positive("resolution", resolution)?;
        Ok(Self { resolution })
    }

    /// Grid spacing on `[0, 1]`.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Picks `t = round(argmin φ, 4)` and returns the step `x + t·d`.
    pub fn search<C>(&self, cost_fn: &C, point: &Point, direction: &Vector) -> Result<LineSearchResult>
    where
        C: CostFunction + ?Sized,
    {
        let mut function_evals = 0;
        let raw = try_uniform_search(
            |t| {
                function_evals += 1;
                cost_fn.cost(&(point + direction * t))
            },
            0.0,
            1.0,
            self.resolution,
        )?;
        let step_size = round_to_decimals(raw, constants::EXACT_STEP_DECIMALS);

        let new_point = point + direction * step_size;
        let new_value = cost_fn.cost(&new_point)?;
        function_evals += 1;
        trace!("uniform line search: t = {}, f = {:e}", step_size, new_value);

        Ok(LineSearchResult {
            step_size,
            new_point,
            new_value,
            function_evals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost_function::{CountingCostFunction, FnCost, QuadraticCost};
    use approx::assert_relative_eq;
    use nalgebra::dvector;
    use proptest::prelude::*;

    #[test]
    fn test_params_validation() {
        assert!(LineSearchParams::default().validate().is_ok());
        assert!(LineSearchParams::default()
            .with_initial_step_size(0.0)
            .validate()
            .is_err());
        assert!(LineSearchParams::default().with_rho(1.0).validate().is_err());
        assert!(LineSearchParams::default().with_rho(0.0).validate().is_err());
    }

    #[test]
    fn test_backtracking_accepts_full_step() {
        let cost_fn = QuadraticCost::simple(2);
        let x = dvector![1.0, 1.0];
        let d = dvector![-0.5, -0.5];
        let result = BacktrackingLineSearch::new()
            .search(&cost_fn, &x, 2.0, &d, &LineSearchParams::default())
            .unwrap();

        assert_eq!(result.step_size, 1.0);
        assert_eq!(result.function_evals, 1);
        assert_relative_eq!(result.new_point, dvector![0.5, 0.5]);
    }

    #[test]
    fn test_backtracking_halves() {
        // From x = 1 along d = -4: t = 1 lands on -3 (f = 9), t = 0.5 on -1 (f = 1).
        let cost_fn = QuadraticCost::simple(1);
        let result = BacktrackingLineSearch::new()
            .search(
                &cost_fn,
                &dvector![1.0],
                1.0,
                &dvector![-4.0],
                &LineSearchParams::default(),
            )
            .unwrap();

        assert_eq!(result.step_size, 0.5);
        assert_eq!(result.function_evals, 2);
        assert_eq!(result.new_value, 1.0);
    }

    #[test]
    fn test_backtracking_zero_direction_is_accepted() {
        let cost_fn = QuadraticCost::simple(2);
        let x = dvector![1.0, 2.0];
        let result = BacktrackingLineSearch::new()
            .search(&cost_fn, &x, 5.0, &Vector::zeros(2), &LineSearchParams::default())
            .unwrap();
        assert_eq!(result.new_point, x);
    }

    #[test]
    fn test_backtracking_is_bounded() {
        // Every move away from 0 increases |x|, so no step is ever accepted.
        let cost_fn = FnCost::new(|x: &Point| x[0].abs());
        let counting = CountingCostFunction::new(&cost_fn);
        let params = LineSearchParams::default().with_max_halvings(10);

        let err = BacktrackingLineSearch::new()
            .search(&counting, &dvector![0.0], 0.0, &dvector![1.0], &params)
            .unwrap_err();

        match err {
            OptimizerError::LineSearchFailed {
                iterations,
                last_step_size,
                initial_value,
                ..
            } => {
                assert_eq!(iterations, 10);
                assert_eq!(last_step_size, 0.5f64.powi(10));
                assert_eq!(initial_value, 0.0);
            }
            other => panic!("Expected LineSearchFailed, got {other:?}"),
        }
        assert_eq!(counting.count(), 11);
    }

    #[test]
    fn test_backtracking_rejects_nan() {
        let cost_fn = FnCost::new(|x: &Point| if x[0] > 0.5 { f64::NAN } else { x[0] * x[0] });
        let result = BacktrackingLineSearch::new()
            .search(
                &cost_fn,
                &dvector![-1.0],
                1.0,
                &dvector![2.0],
                &LineSearchParams::default(),
            )
            .unwrap();
        // t = 1 lands on 1.0 (NaN), t = 0.5 on 0.0.
        assert_eq!(result.step_size, 0.5);
        assert_eq!(result.new_value, 0.0);
    }

    #[test]
    fn test_uniform_search_known_minimum() {
        let x = uniform_search(|t| (t - 0.25) * (t - 0.25), 0.0, 1.0, 0.01).unwrap();
        assert!((x - 0.25).abs() <= 0.01);
    }

    #[test]
    fn test_uniform_search_first_occurrence_wins() {
        // Constant function: the left end is never replaced.
        let x = uniform_search(|_| 1.0, -2.0, 3.0, 0.5).unwrap();
        assert_eq!(x, -2.0);
    }

    #[test]
    fn test_uniform_search_degenerate_interval() {
        let mut calls = 0;
        let x = uniform_search(
            |t| {
                calls += 1;
                t
            },
            1.5,
            1.5,
            0.1,
        )
        .unwrap();
        assert_eq!(x, 1.5);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_uniform_search_truncates_grid() {
        // n = 2.5: only i = 1, 2 are visited, so b itself is never evaluated.
        let mut visited = Vec::new();
        uniform_search(
            |t| {
                visited.push(t);
                -t
            },
            0.0,
            1.0,
            0.4,
        )
        .unwrap();
        assert_eq!(visited.len(), 3);
        assert_relative_eq!(visited[1], 0.4, epsilon = 1e-12);
        assert_relative_eq!(visited[2], 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_search_invalid_arguments() {
        assert!(uniform_search(|t| t, 0.0, 1.0, 0.0).is_err());
        assert!(uniform_search(|t| t, 1.0, 0.0, 0.1).is_err());
        assert!(uniform_search(|t| t, f64::NEG_INFINITY, 0.0, 0.1).is_err());
    }

    #[test]
    fn test_uniform_line_search_rounds_step() {
        // φ(t) = (t - 1/3)², best grid point near 0.333.
        let cost_fn = QuadraticCost::simple(1);
        let line_search = UniformLineSearch::new(1e-3).unwrap();
        let result = line_search
            .search(&cost_fn, &dvector![-1.0 / 3.0], &dvector![1.0])
            .unwrap();

        assert_eq!(result.step_size, 0.333);
        assert_eq!(result.function_evals, 1 + 1000 + 1);
        assert_relative_eq!(result.new_point[0], 0.333 - 1.0 / 3.0, epsilon = 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn uniform_search_within_one_grid_step(
            center in -5.0f64..5.0,
            width in 0.5f64..4.0,
            frac in 0.0f64..1.0,
            resolution in 1e-3f64..1e-1,
        ) {
            let a = center - width / 2.0;
            let b = center + width / 2.0;
            let minimizer = a + frac * width;
            let x = uniform_search(|t| (t - minimizer).powi(2), a, b, resolution).unwrap();

            let n = ((b - a) / resolution).floor();
            let spacing = (b - a) / ((b - a) / resolution);
            // The last grid point may fall short of b by less than one step.
            let tolerance = if minimizer > a + n * spacing { 2.0 * spacing } else { spacing };
            prop_assert!((x - minimizer).abs() <= tolerance + 1e-9);
        }
    }
}
