//! Argument checks shared by layer operations.
//!
//! Each check logs a warning naming the rejected operation and returns the
//! matching [`LayerError`], so callers can bail out with `?` before touching
//! any state.

use crate::error::{LayerError, Result};
use crate::matrix::Matrix2d;
use log::warn;

/// Check that `matrix` is square with side length `expected`.
pub fn check_square_size(matrix: &Matrix2d, expected: usize, operation: &'static str) -> Result<()> {
    match_dimensions(expected, matrix.size(), operation)?;
    check_square(matrix, operation)
}

/// Check that two sizes agree.
pub fn match_dimensions(expected: usize, got: usize, operation: &'static str) -> Result<()> {
    if expected != got {
        warn!("Dimension mismatch during {operation}: expected {expected}, got {got}");
        return Err(LayerError::DimensionMismatch {
            operation,
            expected,
            got,
        });
    }
    Ok(())
}

/// Check that `matrix` has as many columns as rows.
pub fn check_square(matrix: &Matrix2d, operation: &'static str) -> Result<()> {
    if !matrix.is_square() {
        warn!(
            "Non-square {}x{} matrix passed to {operation}",
            matrix.size(),
            matrix.cols()
        );
        return Err(LayerError::NonSquareMatrix {
            operation,
            rows: matrix.size(),
            cols: matrix.cols(),
        });
    }
    Ok(())
}

/// Check that a learning rate is finite and strictly positive.
pub fn check_learning_rate(rate: f64, operation: &'static str) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        warn!("Invalid learning rate {rate} during {operation}");
        return Err(LayerError::InvalidLearningRate { operation, rate });
    }
    Ok(())
}
