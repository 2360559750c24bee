//! Compositional manipulation of the 3D transforms applied to visual
//! elements.
//!
//! A [`TransformMatrix`] is read from an element through an
//! [`ElementAdapter`], transformed by chaining value-returning operations and
//! finally written back with [`TransformMatrix::apply`]. Rotation and scale
//! are recovered by polar decomposition when needed, and the hints that make
//! this cheap are remembered per element in a [`TransformCache`] owned by the
//! caller.

pub mod cache;
pub mod config;
pub mod css;
pub mod element;
pub mod memory;
pub mod origin;
pub mod transform;
pub mod vector;

pub use cache::{CachedTransform, TransformCache};
pub use config::TransformConfig;
pub use element::{ElementAdapter, ElementDimensions, ElementHandle, ElementId, ElementRef};
pub use memory::MemoryAdapter;
pub use origin::OriginSpec;
pub use transform::{AxisAngle, DecompositionHints, TransformMatrix};
pub use vector::PartialVector3;

use restyle_math::MatrixError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors produced while reading, manipulating or writing transforms.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Selector `{selector}` does not refer to an element")]
    ElementNotFound { selector: String },

    #[error("Element must be given as a handle or a non-empty selector")]
    InvalidElementArgument,

    #[error("Transform `{value}` has {n_components} components, expected 6 or 16")]
    MalformedTransform { value: String, n_components: usize },

    #[error("Could not parse transform origin `{value}`")]
    MalformedOrigin { value: String },

    #[error("Expected a 4x4 transform matrix, got {n_rows}x{n_cols}")]
    NotATransform { n_rows: usize, n_cols: usize },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("Element adapter failed: {0:#}")]
    Adapter(#[from] anyhow::Error),
}
