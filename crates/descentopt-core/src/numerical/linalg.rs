//! Dense linear algebra helpers on top of nalgebra.
//!
//! These wrap the few matrix operations the Newton methods need so that
//! every failure mode is a typed [`OptimizerError`] instead of a panic or
//! a matrix full of infinities.

use crate::core::{
    error::{OptimizerError, Result},
    types::{Matrix, Point},
};

fn require_square(matrix: &Matrix) -> Result<()> {
    if matrix.is_square() {
        Ok(())
    } else {
        Err(OptimizerError::dimension_mismatch(
            "square matrix",
            format!("{}x{} matrix", matrix.nrows(), matrix.ncols()),
        ))
    }
}

/// Determinant of a square matrix.
pub fn determinant(matrix: &Matrix) -> Result<f64> {
    require_square(matrix)?;
    Ok(matrix.determinant())
}

/// Inverse of a square matrix.
///
/// # Errors
///
/// - `DimensionMismatch` if the matrix is not square
/// - `SingularMatrix` if the determinant vanishes or the inverse is not finite
pub fn inverse(matrix: &Matrix) -> Result<Matrix> {
    let det = determinant(matrix)?;
    if det == 0.0 || !det.is_finite() {
        return Err(OptimizerError::singular_matrix(format!(
            "determinant is {det}"
        )));
    }

    let inverse = matrix
        .clone()
        .try_inverse()
        .ok_or_else(|| OptimizerError::singular_matrix("LU decomposition has a zero pivot"))?;

    if inverse.iter().all(|v| v.is_finite()) {
        Ok(inverse)
    } else {
        Err(OptimizerError::singular_matrix("inverse has non-finite entries"))
    }
}

/// Positive-definiteness test.
///
/// The symmetric part `(M + Mᵀ)/2` is tested with a Cholesky factorization,
/// since finite-difference Hessians are only symmetric up to rounding.
/// Non-square or non-finite matrices are never positive-definite.
pub fn is_positive_definite(matrix: &Matrix) -> bool {
    if !matrix.is_square() || matrix.is_empty() || matrix.iter().any(|v| !v.is_finite()) {
        return false;
    }
    let symmetric = (matrix + matrix.transpose()) * 0.5;
    symmetric.cholesky().is_some_and(|factor| {
        factor
            .l_dirty()
            .diagonal()
            .iter()
            .all(|d| d.is_finite() && *d > 0.0)
    })
}

/// Clone of `point` with `delta` added to coordinate `index`.
pub fn perturbed(point: &Point, index: usize, delta: f64) -> Result<Point> {
    let mut result = point.clone();
    match result.get_mut(index) {
        Some(value) => {
            *value += delta;
            Ok(result)
        }
        None => Err(OptimizerError::dimension_mismatch(
            format!("index below {}", point.len()),
            index,
        )),
    }
}
