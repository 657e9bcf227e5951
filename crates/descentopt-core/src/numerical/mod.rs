//! Numerical building blocks: finite differences and dense linear algebra.

pub mod differentiation;
pub mod linalg;

pub use differentiation::FiniteDifference;
