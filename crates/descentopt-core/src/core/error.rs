//! Error types for descent optimization.
//!
//! Every fallible operation in the workspace returns [`OptimizerError`].
//! Running out of iterations is not an error: it is reported through
//! [`TerminationReason::MaxIterations`](crate::optimizer::TerminationReason).

use thiserror::Error;

/// Errors that can occur while differentiating, searching or optimizing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// Dimension mismatch between a point and the objective or between operands.
    ///
    /// Raised at entry when the initial point does not have the arity the
    /// objective declares, and by linear algebra helpers on shape mismatch.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// A matrix could not be inverted.
    ///
    /// Newton methods catch this and fall back to the steepest-descent
    /// direction; it only escapes from direct calls into [`crate::linalg`].
    #[error("Singular matrix: {reason}")]
    SingularMatrix {
        /// Description of why the matrix is singular
        reason: String,
    },

    /// Backtracking exhausted its halving budget without a decrease.
    #[error("Line search failed: {reason}")]
    LineSearchFailed {
        /// Description of why the line search failed
        reason: String,
        /// Number of halvings attempted
        iterations: usize,
        /// Last step size tried
        last_step_size: f64,
        /// Function value at the starting point
        initial_value: f64,
    },

    /// Invalid optimizer configuration.
    ///
    /// This error occurs when a tolerance, step size or resolution is
    /// outside its admissible range.
    #[error("Invalid optimizer configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// Numerical instability detected, such as a non-finite objective value.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl OptimizerError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a SingularMatrix error with a custom reason.
    pub fn singular_matrix<S: Into<String>>(reason: S) -> Self {
        Self::SingularMatrix {
            reason: reason.into(),
        }
    }

    /// Create a LineSearchFailed error with detailed context.
    pub fn line_search_failed<S: Into<String>>(
        reason: S,
        iterations: usize,
        last_step_size: f64,
        initial_value: f64,
    ) -> Self {
        Self::LineSearchFailed {
            reason: reason.into(),
            iterations,
            last_step_size,
            initial_value,
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Checks that `value` is finite and strictly positive.
    pub fn require_positive(parameter: &str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::invalid_configuration(
                "must be finite and strictly positive",
                parameter,
                value.to_string(),
            ))
        }
    }
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;
