//! Configuration of transform reading and writing.

use crate::{Result, css::DEFAULT_DECIMAL_PLACES};
use restyle_math::{MatrixError, PolarDecompositionConfig};

/// Configuration parameters for transforms and the [`TransformCache`](crate::TransformCache).
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct TransformConfig {
    /// The number of decimal places matrix values are rounded to when a
    /// transform is written back to an element.
    pub decimal_places: u32,
    /// The largest per-element difference between the matrix read from an
    /// element and the one last applied to it for which cached decomposition
    /// hints are still trusted.
    pub cache_match_tolerance: f64,
    /// Parameters for recovering rotation and stretch from combined
    /// matrices.
    pub polar_decomposition: PolarDecompositionConfig,
}

impl TransformConfig {
    /// Checks that all parameters are in range.
    ///
    /// # Errors
    /// Returns an error describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if self.decimal_places > 15 {
            return Err(MatrixError::InvalidConfiguration(format!(
                "Invalid number of decimal places for transforms: {}",
                self.decimal_places
            ))
            .into());
        }
        if !(self.cache_match_tolerance.is_finite() && self.cache_match_tolerance >= 0.0) {
            return Err(MatrixError::InvalidConfiguration(format!(
                "Invalid cache match tolerance: {}",
                self.cache_match_tolerance
            ))
            .into());
        }
        self.polar_decomposition.validate()?;
        Ok(())
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            cache_match_tolerance: 1e-6,
            polar_decomposition: PolarDecompositionConfig::default(),
        }
    }
}
