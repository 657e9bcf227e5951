//! Type aliases and numerical constants.
//!
//! All computations run in `f64` on dynamically sized nalgebra storage;
//! the dimension of a problem is fixed by the initial point.

pub use nalgebra::{DMatrix, DVector};

/// A point of the search space ℝⁿ.
pub type Point = DVector<f64>;

/// A vector of ℝⁿ (gradients and search directions).
pub type Vector = DVector<f64>;

/// A square n×n matrix (Hessians and their inverses).
pub type Matrix = DMatrix<f64>;

/// Numerical constants shared by the differentiator and line searches.
pub mod constants {
    /// Default perturbation for finite differences.
    pub const DEFAULT_FINITE_DIFFERENCE_STEP: f64 = 1e-5;

    /// Default cap on the number of step halvings in backtracking.
    pub const DEFAULT_MAX_HALVINGS: usize = 50;

    /// Default initial step size `t0` for backtracking.
    pub const DEFAULT_INITIAL_STEP_SIZE: f64 = 1.0;

    /// Default reduction factor applied by backtracking.
    pub const DEFAULT_BACKTRACKING_FACTOR: f64 = 0.5;

    /// Decimal places kept on step lengths chosen by exact line search.
    pub const EXACT_STEP_DECIMALS: i32 = 4;
}

/// Rounds `value` to `decimals` places, ties to even.
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to_decimals(0.123_449, 4), 0.1234);
        assert_eq!(round_to_decimals(0.123_46, 4), 0.1235);
        assert_eq!(round_to_decimals(1.0, 4), 1.0);
        assert_eq!(round_to_decimals(0.0, 4), 0.0);
    }

    #[test]
    fn test_round_ties_to_even() {
        // 0.5 and 2.5 are exactly representable.
        assert_eq!(round_to_decimals(0.5, 0), 0.0);
        assert_eq!(round_to_decimals(2.5, 0), 2.0);
        assert_eq!(round_to_decimals(3.5, 0), 4.0);
    }
}
