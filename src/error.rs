//! Error types for layer construction and layer operations.

use thiserror::Error;

/// Errors reported by layers and their supporting containers.
///
/// Construction errors (`InvalidKernelSize`, `KernelExceedsInput`) mean the
/// layer was never created. The remaining variants are returned by runtime
/// operations, which leave the layer state exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("invalid kernel size {size}: kernel size must be in range [{min}, {max}]")]
    InvalidKernelSize { size: usize, min: usize, max: usize },

    #[error("kernel size {kernel_size} cannot be greater than input size {input_size}")]
    KernelExceedsInput {
        kernel_size: usize,
        input_size: usize,
    },

    #[error("dimension mismatch in {operation}: expected {expected}, got {got}")]
    DimensionMismatch {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("matrix used in {operation} is not square ({rows}x{cols})")]
    NonSquareMatrix {
        operation: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid learning rate {rate} in {operation}: must be finite and positive")]
    InvalidLearningRate { operation: &'static str, rate: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LayerError>;
