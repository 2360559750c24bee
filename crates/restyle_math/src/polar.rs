//! Polar decomposition of linear maps into rotation and stretch.

use crate::{Matrix, MatrixError, Result};

/// Configuration parameters for [`PolarDecomposer`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarDecompositionConfig {
    /// The iteration stops once no element of the rotation estimate changes
    /// by more than this between two steps.
    pub tolerance: f64,
    /// The maximum number of Newton steps to take before giving up.
    pub max_iterations: u32,
}

/// Splits a square linear map `M` into an orthogonal matrix `R` and a
/// symmetric stretch `S` with `M = R * S`, using the Newton iteration
/// `Q <- (Q + Q^-T) / 2` starting from `Q = M`.
///
/// The estimate from before the converging step is taken as `R`, so that `S`
/// can be computed exactly from the inverse already at hand. An input that is
/// orthogonal to begin with is returned unchanged as the rotation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolarDecomposer {
    config: PolarDecompositionConfig,
}

/// The result of a polar decomposition: a rotation and the stretch applied
/// before it.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarDecomposition {
    rotation: Matrix,
    stretch: Matrix,
}

impl PolarDecompositionConfig {
    /// Checks that the parameters can drive the iteration.
    ///
    /// # Errors
    /// Returns [`MatrixError::InvalidConfiguration`] if the tolerance is not a
    /// positive finite number or the iteration cap is zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(MatrixError::InvalidConfiguration(format!(
                "Invalid tolerance for polar decomposition: {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(MatrixError::InvalidConfiguration(
                "Polar decomposition needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PolarDecompositionConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl PolarDecomposer {
    /// Creates a decomposer with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PolarDecompositionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolarDecompositionConfig {
        &self.config
    }

    /// Decomposes the given square matrix.
    ///
    /// # Errors
    /// Returns an error if the matrix is not square, if it or one of the
    /// iterates is singular, or if the iteration does not converge within the
    /// configured number of steps.
    pub fn decompose(&self, linear: &Matrix) -> Result<PolarDecomposition> {
        if !linear.is_square() {
            return Err(MatrixError::NotSquare {
                n_rows: linear.n_rows(),
                n_cols: linear.n_cols(),
            });
        }

        let mut estimate = linear.clone();

        for iteration in 1..=self.config.max_iterations {
            let inverse = estimate.inverse()?;
            let next = estimate.add(&inverse.transpose())?.scalar_multiply(0.5);

            if next.equals(&estimate, self.config.tolerance) {
                log::trace!("Polar decomposition converged after {iteration} iterations");
                let stretch = inverse.matrix_multiply(linear)?;
                return Ok(PolarDecomposition::new(estimate, stretch));
            }

            estimate = next;
        }

        log::debug!(
            "Polar decomposition gave up after {} iterations",
            self.config.max_iterations
        );
        Err(MatrixError::NoConvergence {
            iterations: self.config.max_iterations,
        })
    }
}

impl PolarDecomposition {
    pub fn new(rotation: Matrix, stretch: Matrix) -> Self {
        Self { rotation, stretch }
    }

    /// The orthogonal factor.
    pub fn rotation(&self) -> &Matrix {
        &self.rotation
    }

    /// The symmetric factor, applied before the rotation.
    pub fn stretch(&self) -> &Matrix {
        &self.stretch
    }

    pub fn into_parts(self) -> (Matrix, Matrix) {
        (self.rotation, self.stretch)
    }

    /// Returns the decomposition with both factors padded to homogeneous
    /// matrices of one size larger.
    pub fn padded_to_homogeneous(&self) -> Self {
        Self::new(
            self.rotation.pad_to_homogeneous(),
            self.stretch.pad_to_homogeneous(),
        )
    }

    /// Multiplies the factors back together.
    ///
    /// # Errors
    /// Returns an error if the factors have incompatible shapes.
    pub fn recompose(&self) -> Result<Matrix> {
        self.rotation.matrix_multiply(&self.stretch)
    }
}

impl_approx_eq!(
    PolarDecomposition,
    |a, b| true,
    [(&a.rotation, &b.rotation), (&a.stretch, &b.stretch)]
);
