//! Finite-difference derivatives of black-box objectives.
//!
//! First derivatives use a forward difference and second derivatives a
//! four-point central difference, both with a fixed perturbation `δ`:
//!
//! ```text
//! ∂f/∂xᵢ     ≈ (f(x + δeᵢ) − f(x)) / δ
//! ∂²f/∂xᵢ∂xⱼ ≈ (f(x+δeᵢ+δeⱼ) − f(x+δeᵢ−δeⱼ) − f(x−δeᵢ+δeⱼ) + f(x−δeᵢ−δeⱼ)) / 4δ²
//! ```
//!
//! The step does not adapt to the scale of `x`; callers with badly scaled
//! objectives should pick their own through [`FiniteDifference::new`].
//!
//! # Cost
//!
//! A gradient costs `2n` objective evaluations and a Hessian `4n²`. The
//! Hessian dominates the per-iteration cost of the Newton methods.

use crate::core::{
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    types::{constants, Matrix, Point, Vector},
};
use crate::numerical::linalg::perturbed;

/// Finite-difference differentiator with a fixed perturbation step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiniteDifference {
    step: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
        }
    }
}

impl FiniteDifference {
    /// Default perturbation `δ = 1e-5`.
    pub const DEFAULT_STEP: f64 = constants::DEFAULT_FINITE_DIFFERENCE_STEP;

    /// Creates a differentiator with perturbation `step`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `step` is finite and positive.
    pub fn new(step: f64) -> Result<Self> {
        OptimizerError::require_positive("finite_difference_step", step)?;
        Ok(Self { step })
    }

    /// The perturbation used by this differentiator.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Forward difference `(f(x + δeᵢ) − f(x)) / δ`.
    pub fn first_partial<C>(&self, cost_fn: &C, point: &Point, i: usize) -> Result<f64>
    where
        C: CostFunction + ?Sized,
    {
        let forward = perturbed(point, i, self.step)?;
        let f_forward = cost_fn.cost(&forward)?;
        let f_here = cost_fn.cost(point)?;
        Ok((f_forward - f_here) / self.step)
    }

    /// Four-point central difference for `∂²f/∂xᵢ∂xⱼ`, including `i == j`.
    pub fn second_partial<C>(&self, cost_fn: &C, point: &Point, i: usize, j: usize) -> Result<f64>
    where
        C: CostFunction + ?Sized,
    {
        let h = self.step;
        let shifted = |si: f64, sj: f64| -> Result<f64> {
            let x = perturbed(&perturbed(point, i, si * h)?, j, sj * h)?;
            cost_fn.cost(&x)
        };

        let f_pp = shifted(1.0, 1.0)?;
        let f_pm = shifted(1.0, -1.0)?;
        let f_mp = shifted(-1.0, 1.0)?;
        let f_mm = shifted(-1.0, -1.0)?;

        Ok((f_pp - f_pm - f_mp + f_mm) / (4.0 * h * h))
    }

    /// Gradient assembled from [`first_partial`](Self::first_partial).
    pub fn gradient<C>(&self, cost_fn: &C, point: &Point) -> Result<Vector>
    where
        C: CostFunction + ?Sized,
    {
        let n = point.len();
        let mut gradient = Vector::zeros(n);
        for i in 0..n {
            gradient[i] = self.first_partial(cost_fn, point, i)?;
        }
        Ok(gradient)
    }

    /// Hessian assembled from [`second_partial`](Self::second_partial) for every pair.
    pub fn hessian<C>(&self, cost_fn: &C, point: &Point) -> Result<Matrix>
    where
        C: CostFunction + ?Sized,
    {
        let n = point.len();
        let mut hessian = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                hessian[(i, j)] = self.second_partial(cost_fn, point, i, j)?;
            }
        }
        Ok(hessian)
    }
}
