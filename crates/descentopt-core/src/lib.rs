//! Core traits and types for unconstrained descent optimization.
//!
//! This crate provides the building blocks shared by every algorithm in
//! `descentopt-optim`: the objective interface, finite-difference
//! derivatives, the dense linear algebra used by Newton methods, line
//! searches and the common stopping protocol.
//!
//! # Key Concepts
//!
//! - **Black-box objectives**: only values `f(x)` are ever requested
//! - **Finite differences**: gradients and Hessians are approximated with a
//!   configurable perturbation step
//! - **Line searches**: halving backtracking and uniform grid search
//! - **Double-consecutive convergence**: two small steps in a row stop a run
//!
//! # Modules
//!
//! - [`cost_function`]: Cost function interface and adapters
//! - [`error`]: Error types
//! - [`differentiation`]: Finite-difference gradient and Hessian
//! - [`linalg`]: Inverse, determinant and positive-definiteness
//! - [`line_search`]: Line search algorithms
//! - [`optimizer`]: Optimizer trait, stopping criterion and results
//! - [`types`]: Type aliases and numerical constants

pub mod core;
pub mod numerical;
pub mod optimization;

pub use crate::core::{cost_function, error, types};
pub use crate::numerical::{differentiation, linalg};
pub use crate::optimization::{line_search, optimizer};

// Re-export commonly used items at the crate root
pub use crate::core::error::{OptimizerError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use descentopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::cost_function::{
        CostFunction, CountingCostFunction, FnCost, QuadraticCost,
    };
    pub use crate::core::error::{OptimizerError, Result};
    pub use crate::core::types::{constants, DMatrix, DVector, Matrix, Point, Vector};
    pub use crate::numerical::differentiation::FiniteDifference;
    pub use crate::optimization::line_search::{
        uniform_search, BacktrackingLineSearch, LineSearchParams, LineSearchResult,
        UniformLineSearch,
    };
    pub use crate::optimization::optimizer::{
        ConvergenceChecker, OptimizationResult, Optimizer, StoppingCriterion, TerminationReason,
    };
}
