//! Matrix algebra for element transforms.

#[macro_use]
mod macros;

pub mod matrix;
pub mod polar;
pub mod snap;

pub use matrix::Matrix;
pub use polar::{PolarDecomposer, PolarDecomposition, PolarDecompositionConfig};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatrixError>;

/// Errors produced by matrix operations.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum MatrixError {
    #[error("Can not combine matrices of incompatible sizes: {}x{} and {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Operation requires a square matrix, got {n_rows}x{n_cols}")]
    NotSquare { n_rows: usize, n_cols: usize },

    #[error("Matrix is singular and has no inverse")]
    SingularMatrix,

    #[error("Matrix must have at least one row and one column")]
    Empty,

    #[error("Row {row} has {found} elements, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Got {found} elements for a matrix with {expected} entries")]
    ElementCount { expected: usize, found: usize },

    #[error("Polar decomposition did not converge within {iterations} iterations")]
    NoConvergence { iterations: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
