//! Cost function interface for descent algorithms.
//!
//! Objectives are black boxes: only values are requested from them, and
//! every derivative is approximated by [`FiniteDifference`](crate::numerical::FiniteDifference).
//!
//! # Design Philosophy
//!
//! - Closures are the common case and are adapted through [`FnCost`]
//! - An objective may declare its arity so mismatched starting points are
//!   rejected before the first evaluation
//! - Evaluation counts are collected by wrapping, not by the objective itself

use crate::{
    core::error::{OptimizerError, Result},
    core::types::{Matrix, Point, Vector},
    numerical::linalg,
};
use std::cell::Cell;
use std::fmt::{self, Debug};

/// Trait for scalar objectives `f : ℝⁿ → ℝ`.
pub trait CostFunction: Debug {
    /// Evaluates the objective at a point.
    fn cost(&self, point: &Point) -> Result<f64>;

    /// Number of coordinates the objective expects, if known.
    ///
    /// Optimizers reject initial points of any other length with
    /// [`OptimizerError::DimensionMismatch`].
    fn dimension(&self) -> Option<usize> {
        None
    }
}

impl<C: CostFunction + ?Sized> CostFunction for &C {
    fn cost(&self, point: &Point) -> Result<f64> {
        (**self).cost(point)
    }

    fn dimension(&self) -> Option<usize> {
        (**self).dimension()
    }
}

/// Checks a starting point against the arity declared by `cost_fn`.
pub fn validate_initial_point<C>(cost_fn: &C, point: &Point) -> Result<()>
where
    C: CostFunction + ?Sized,
{
    if point.is_empty() {
        return Err(OptimizerError::dimension_mismatch(
            "at least one coordinate",
            0,
        ));
    }
    match cost_fn.dimension() {
        Some(expected) if expected != point.len() => Err(OptimizerError::dimension_mismatch(
            expected,
            point.len(),
        )),
        _ => Ok(()),
    }
}

/// Adapter turning a plain closure `Fn(&Point) -> f64` into a [`CostFunction`].
#[derive(Clone)]
pub struct FnCost<F> {
    function: F,
    dimension: Option<usize>,
}

impl<F> FnCost<F>
where
    F: Fn(&Point) -> f64,
{
    /// Wraps a closure without a declared arity.
    pub fn new(function: F) -> Self {
        Self {
            function,
            dimension: None,
        }
    }

    /// Wraps a closure that expects exactly `dimension` coordinates.
    pub fn with_dimension(dimension: usize, function: F) -> Self {
        Self {
            function,
            dimension: Some(dimension),
        }
    }
}

impl<F> Debug for FnCost<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCost")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl<F> CostFunction for FnCost<F>
where
    F: Fn(&Point) -> f64,
{
    fn cost(&self, point: &Point) -> Result<f64> {
        Ok((self.function)(point))
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// Quadratic objective `f(x) = xᵀAx + bᵀx + c`.
#[derive(Debug, Clone)]
pub struct QuadraticCost {
    /// The quadratic form matrix (should be symmetric)
    pub a: Matrix,
    /// The linear term
    pub b: Vector,
    /// The constant term
    pub c: f64,
}

impl QuadraticCost {
    /// Creates a new quadratic cost function.
    pub fn new(a: Matrix, b: Vector, c: f64) -> Result<Self> {
        if !a.is_square() || a.nrows() != b.len() {
            return Err(OptimizerError::dimension_mismatch(
                format!("{0}x{0} matrix", b.len()),
                format!("{}x{} matrix", a.nrows(), a.ncols()),
            ));
        }
        Ok(Self { a, b, c })
    }

    /// Creates `f(x) = ‖x‖²`.
    pub fn simple(dim: usize) -> Self {
        Self {
            a: Matrix::identity(dim, dim),
            b: Vector::zeros(dim),
            c: 0.0,
        }
    }

    /// Analytic gradient `(A + Aᵀ)x + b`.
    pub fn gradient(&self, point: &Point) -> Vector {
        (&self.a + self.a.transpose()) * point + &self.b
    }

    /// Analytic Hessian `A + Aᵀ`.
    pub fn hessian(&self) -> Matrix {
        &self.a + self.a.transpose()
    }

    /// The stationary point `-(A + Aᵀ)⁻¹ b`.
    pub fn minimizer(&self) -> Result<Point> {
        let inverse = linalg::inverse(&self.hessian())?;
        Ok(-(inverse * &self.b))
    }
}

impl CostFunction for QuadraticCost {
    fn cost(&self, point: &Point) -> Result<f64> {
        if point.len() != self.b.len() {
            return Err(OptimizerError::dimension_mismatch(self.b.len(), point.len()));
        }
        let ax = &self.a * point;
        Ok(point.dot(&ax) + self.b.dot(point) + self.c)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.b.len())
    }
}

/// Wrapper to count function evaluations.
#[derive(Debug)]
pub struct CountingCostFunction<'a, C: ?Sized> {
    inner: &'a C,
    count: Cell<usize>,
}

impl<'a, C> CountingCostFunction<'a, C>
where
    C: CostFunction + ?Sized,
{
    /// Creates a new counting wrapper around a cost function.
    pub fn new(inner: &'a C) -> Self {
        Self {
            inner,
            count: Cell::new(0),
        }
    }

    /// Number of evaluations performed so far.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Resets the counter to zero.
    pub fn reset_count(&self) {
        self.count.set(0);
    }
}

impl<C> CostFunction for CountingCostFunction<'_, C>
where
    C: CostFunction + ?Sized,
{
    fn cost(&self, point: &Point) -> Result<f64> {
        self.count.set(self.count.get() + 1);
        self.inner.cost(point)
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}
