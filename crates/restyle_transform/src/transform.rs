//! Homogeneous 3D transforms of elements.

use crate::{
    Result, TransformError,
    cache::TransformCache,
    css,
    element::{ElementAdapter, ElementDimensions, ElementHandle, ElementId, ElementRef},
    origin::OriginSpec,
    vector::PartialVector3,
};
use restyle_math::{
    Matrix, PolarDecomposer, PolarDecomposition,
    snap::{snap, snapped_acos, snapped_asin, snapped_sin_cos},
};
use std::{f64::consts::TAU, sync::OnceLock};

/// The 4x4 homogeneous transform of an element, together with the transform
/// origin that rotation and scaling are anchored at.
///
/// Every operation returns a new `TransformMatrix` and leaves the receiver
/// untouched. Quantities that are expensive to recover from the combined
/// matrix (determinant, inverse, polar decomposition, scale) are kept
/// alongside it as hints. Operations carry hints over to their result when
/// they still hold and drop them otherwise.
#[derive(Clone, Debug)]
pub struct TransformMatrix {
    matrix: Matrix,
    origin: [f64; 3],
    element: ElementHandle,
    dimensions: ElementDimensions,
    decomposer: PolarDecomposer,
    polar_decomposition: OnceLock<PolarDecomposition>,
    scale: Option<[f64; 3]>,
}

/// Known facts about a transform matrix that spare recomputing them.
///
/// The hints are trusted as given. Supplying hints that do not belong to the
/// matrix leads to wrong decompositions, not to errors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecompositionHints {
    pub determinant: Option<f64>,
    pub inverse: Option<Matrix>,
    /// Rotation and stretch factors, padded to 4x4.
    pub polar_decomposition: Option<PolarDecomposition>,
    /// The scale along each local axis, applied before any rotation.
    pub scale: Option<[f64; 3]>,
}

/// A rotation by `angle` radians about `axis`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisAngle {
    pub axis: [f64; 3],
    pub angle: f64,
}

impl TransformMatrix {
    /// Wraps the given 4x4 matrix. Entries within rounding distance of `0`,
    /// `1` or `-1` are snapped to them.
    ///
    /// # Errors
    /// Returns [`TransformError::NotATransform`] if the matrix is not 4x4.
    pub fn new(
        matrix: Matrix,
        origin: [f64; 3],
        element: ElementHandle,
        dimensions: ElementDimensions,
    ) -> Result<Self> {
        require_4x4(&matrix)?;
        Ok(Self::from_parts(
            &matrix,
            origin,
            element,
            dimensions,
            PolarDecomposer::default(),
        ))
    }

    /// Creates the identity transform for the element.
    pub fn identity(
        origin: [f64; 3],
        element: ElementHandle,
        dimensions: ElementDimensions,
    ) -> Self {
        Self::from_parts(
            &Matrix::identity(4),
            origin,
            element,
            dimensions,
            PolarDecomposer::default(),
        )
        .reset()
    }

    /// Reads the current transform of an element.
    ///
    /// Hints cached for the element are used when the matrix read back still
    /// matches the one last applied. Any `hints` given take precedence over
    /// the cached ones.
    ///
    /// # Errors
    /// Returns an error if the element can not be resolved, the adapter fails
    /// or the style values can not be parsed.
    pub fn load<'a>(
        adapter: &impl ElementAdapter,
        cache: &TransformCache,
        element: impl Into<ElementRef<'a>>,
        hints: Option<DecompositionHints>,
    ) -> Result<Self> {
        let element = element.into().resolve(adapter)?;

        let matrix = css::parse_transform(&adapter.read_transform(element)?)?;
        let origin = css::parse_origin(&adapter.read_transform_origin(element)?)?;
        let dimensions = adapter.dimensions(element)?;
        let decomposer = PolarDecomposer::new(cache.config().polar_decomposition)?;

        let transform = Self::from_parts(&matrix, origin, element, dimensions, decomposer);

        let cached = match adapter.identity(element)? {
            Some(id) => cache.lookup(id, &transform.matrix).cloned(),
            None => None,
        };

        let hints = match (cached, hints) {
            (Some(cached), Some(given)) => Some(cached.overridden_by(given)),
            (cached, given) => given.or(cached),
        };

        Ok(match hints {
            Some(hints) => transform.with_hints(hints),
            None => transform,
        })
    }

    /// Returns a copy of the transform carrying the given hints in addition
    /// to or instead of its own. Hints of the wrong shape are ignored.
    pub fn with_hints(self, hints: DecompositionHints) -> Self {
        let Self {
            mut matrix,
            origin,
            element,
            dimensions,
            decomposer,
            polar_decomposition,
            scale,
        } = self;

        if let Some(determinant) = hints.determinant {
            matrix = matrix.with_cached_determinant(determinant);
        }
        if let Some(inverse) = hints.inverse {
            matrix = matrix.with_cached_inverse(inverse);
        }

        let polar_decomposition = match hints.polar_decomposition {
            Some(decomposition)
                if decomposition.rotation().shape() == (4, 4)
                    && decomposition.stretch().shape() == (4, 4) =>
            {
                OnceLock::from(decomposition)
            }
            _ => polar_decomposition,
        };

        Self {
            matrix,
            origin,
            element,
            dimensions,
            decomposer,
            polar_decomposition,
            scale: hints.scale.or(scale),
        }
    }

    /// Returns a copy of the transform that uses the given decomposer when a
    /// polar decomposition has to be computed.
    pub fn with_decomposer(mut self, decomposer: PolarDecomposer) -> Self {
        self.decomposer = decomposer;
        self
    }

    /// The underlying 4x4 matrix.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// The transform origin in pixels, relative to the element's top left
    /// corner.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// The element the transform was read from.
    pub fn element(&self) -> ElementHandle {
        self.element
    }

    pub fn dimensions(&self) -> ElementDimensions {
        self.dimensions
    }

    /// The explicitly known scale, if any.
    pub fn scale_hint(&self) -> Option<[f64; 3]> {
        self.scale
    }

    /// Collects the hints currently known for the matrix.
    pub fn hints(&self) -> DecompositionHints {
        DecompositionHints {
            determinant: self.matrix.cached_determinant(),
            inverse: self.matrix.cached_inverse().cloned(),
            polar_decomposition: self.polar_decomposition.get().cloned(),
            scale: self.scale,
        }
    }

    /// Whether the matrices agree to within `tolerance` per element and the
    /// origins are the same.
    pub fn equals(&self, other: &Self, tolerance: f64) -> bool {
        self.origin == other.origin && self.matrix.equals(&other.matrix, tolerance)
    }

    /// Returns the translation in pixels.
    pub fn translation(&self) -> [f64; 3] {
        [
            self.matrix.get(0, 3),
            self.matrix.get(1, 3),
            self.matrix.get(2, 3),
        ]
    }

    /// Translates by the given offsets in pixels. Unspecified components
    /// leave the translation along that axis as it is.
    pub fn translate(&self, by: impl Into<PartialVector3>) -> Self {
        let [dx, dy, dz] = by.into().resolve(0.0);
        let [x, y, z] = self.translation();
        self.set_translate([x + dx, y + dy, z + dz])
    }

    /// Replaces the translation. Unspecified components are set to `0`.
    pub fn set_translate(&self, to: impl Into<PartialVector3>) -> Self {
        let translation = to.into().resolve(0.0);
        let mut rows = self.rows();
        for (row, value) in rows.iter_mut().zip(translation) {
            row[3] = value;
        }
        let mut translated = self.derived(&Matrix::from_array(rows));
        translated.polar_decomposition = self.polar_decomposition.clone();
        translated.scale = self.scale;
        translated
    }

    /// Scales relative to the current scale, along the element's local axes.
    /// Unspecified factors are `1`.
    pub fn scale(&self, by: impl Into<PartialVector3>) -> Self {
        let by = by.into().resolve(1.0);

        let mut rows = self.rows();
        for row in &mut rows {
            for (value, factor) in row.iter_mut().zip(by) {
                *value *= factor;
            }
        }

        let current_scale = self
            .scale
            .or_else(|| self.polar_decomposition.get().map(stretch_diagonal))
            .or_else(|| (!self.has_rotation()).then(|| self.diagonal()));

        let mut scaled = self.derived(&Matrix::from_array(rows));
        scaled.scale = current_scale.map(|scale| componentwise_product(scale, by));
        scaled
    }

    /// Sets the scale along the element's local axes without changing its
    /// orientation or translation. Unspecified factors are `1`.
    ///
    /// # Errors
    /// Returns an error if the current orientation can not be recovered.
    pub fn set_scale(&self, to: impl Into<PartialVector3>) -> Result<Self> {
        let scale = to.into().resolve(1.0);
        let rotation = self.polar_decompose()?.rotation().clone();

        let stretch = Matrix::from_diagonal(&[scale[0], scale[1], scale[2], 1.0]);
        let mut rows = matrix_rows(&rotation.matrix_multiply(&stretch)?);
        for (row, value) in rows.iter_mut().zip(self.translation()) {
            row[3] = value;
        }

        let mut scaled = self.derived(&Matrix::from_array(rows));
        scaled.scale = Some(scale);
        Ok(scaled)
    }

    /// Returns the scale along the element's local axes.
    ///
    /// # Errors
    /// Returns an error if the matrix has to be decomposed and the
    /// decomposition fails.
    pub fn scale_vector(&self) -> Result<[f64; 3]> {
        if let Some(scale) = self.scale {
            Ok(scale)
        } else if self.has_rotation() {
            Ok(stretch_diagonal(self.polar_decompose()?))
        } else {
            Ok(self.diagonal())
        }
    }

    /// Whether the matrix may contain a rotation, judged from the entries
    /// above the diagonal in cyclic order and the signs on the diagonal.
    pub fn has_rotation(&self) -> bool {
        let m = &self.matrix;
        m.get(0, 1) != 0.0
            || m.get(1, 2) != 0.0
            || m.get(2, 0) != 0.0
            || self.diagonal().iter().any(|&value| value < 0.0)
    }

    /// Rotates by `angle` radians about `axis`, clockwise when looking along
    /// the axis as is the convention for on-screen rotation. A zero axis
    /// leaves the transform unchanged.
    ///
    /// The rotation is applied after the current linear part, so any scale
    /// stays along the element's local axes. The translation is kept.
    pub fn rotate(&self, axis: [f64; 3], angle: f64) -> Self {
        let norm = axis.iter().map(|component| component * component).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return self.clone();
        }

        let [x, y, z] = axis.map(|component| -component / norm);
        let (sin, cos) = snapped_sin_cos(angle);
        let pcos = 1.0 - cos;

        let rotation = [
            [
                1.0 + pcos * (x * x - 1.0),
                z * sin + x * y * pcos,
                -y * sin + x * z * pcos,
                0.0,
            ],
            [
                -z * sin + x * y * pcos,
                1.0 + pcos * (y * y - 1.0),
                x * sin + y * z * pcos,
                0.0,
            ],
            [
                y * sin + x * z * pcos,
                -x * sin + y * z * pcos,
                1.0 + pcos * (z * z - 1.0),
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ];

        let rows = self.rows();
        let mut product = multiply_4x4(&rotation, &rows);
        for (row, source) in product.iter_mut().zip(rows) {
            row[3] = source[3];
        }

        let mut rotated = self.derived(&Matrix::from_array(product));
        rotated.scale = self.scale;
        rotated
    }

    /// Recovers the rotation as an axis and an angle in `[0, 2π)`.
    ///
    /// The axis components are recovered from the diagonal and are therefore
    /// never negative. The sign of the angle is inferred from the first
    /// usable off-diagonal entry. Rotations about axes with more than one
    /// negative or near-zero component may thus come back as a different
    /// rotation. A half turn about a coordinate axis leaves every
    /// off-diagonal entry zero, so its angle comes back as `0`.
    ///
    /// # Errors
    /// Returns an error if the polar decomposition fails.
    pub fn rotation(&self) -> Result<AxisAngle> {
        let decomposition = self.polar_decompose()?;
        let r = decomposition.rotation();

        let cos = snap((r.get(0, 0) + r.get(1, 1) + r.get(2, 2) - 1.0) / 2.0);
        let acos = snapped_acos(cos);
        let pcos = 1.0 - cos;

        let axis = [0, 1, 2].map(|k| {
            let component = snap((r.get(k, k) - 1.0) / pcos + 1.0).sqrt();
            if component.is_finite() {
                component
            } else {
                0.0
            }
        });
        let [a0, a1, a2] = axis;

        let asin = [
            (r.get(1, 2) - a1 * a2 * pcos) / a0,
            (r.get(2, 0) - a0 * a2 * pcos) / a1,
            (r.get(0, 1) - a0 * a1 * pcos) / a2,
        ]
        .into_iter()
        .map(snapped_asin)
        .find(|&value| value.is_finite() && value != 0.0)
        .map_or(0.0, |value| -value);

        let angle = if asin > 0.0 {
            acos
        } else {
            (TAU + asin) % TAU
        };

        Ok(AxisAngle { axis, angle })
    }

    /// Replaces the rotation while keeping scale and translation.
    ///
    /// # Errors
    /// Returns an error if the current scale can not be recovered.
    pub fn set_rotate(&self, axis: [f64; 3], angle: f64) -> Result<Self> {
        let scale = self.scale_vector()?;
        let translation = self.translation();
        Ok(self
            .reset()
            .set_scale(scale)?
            .set_translate(translation)
            .rotate(axis, angle))
    }

    /// Splits the linear part of the transform into a rotation and a stretch
    /// applied before it, both padded to 4x4. The result is memoized.
    ///
    /// # Errors
    /// Returns an error if the linear part is singular or the iteration does
    /// not converge.
    pub fn polar_decompose(&self) -> Result<&PolarDecomposition> {
        if let Some(decomposition) = self.polar_decomposition.get() {
            return Ok(decomposition);
        }

        let linear = self.matrix.submatrix(0..3, 0..3)?;

        let decomposition = if !self.has_rotation() {
            PolarDecomposition::new(Matrix::identity(4), linear.pad_to_homogeneous())
        } else if let Some(scale) = self.scale {
            let stretch = Matrix::from_diagonal(&scale);
            let rotation = linear.matrix_multiply(&stretch.inverse()?)?;
            PolarDecomposition::new(rotation, stretch).padded_to_homogeneous()
        } else {
            self.decomposer.decompose(&linear)?.padded_to_homogeneous()
        };

        Ok(self.polar_decomposition.get_or_init(|| decomposition))
    }

    /// Moves the transform origin without moving the element on screen, by
    /// compensating with a translation. Components the argument leaves
    /// unspecified keep their current value.
    ///
    /// # Errors
    /// Returns an error if the argument can not be parsed or the current
    /// rotation and scale can not be recovered.
    pub fn change_origin<'a>(&self, new_origin: impl Into<OriginSpec<'a>>) -> Result<Self> {
        let new_origin = new_origin.into().resolve(self.dimensions)?;

        let old_origin = self.origin;
        let shift = [0, 1, 2].map(|i| {
            new_origin.components()[i].map_or(0.0, |new| new - old_origin[i])
        });

        let scale = self.scale_vector()?;
        let rotation = self.polar_decompose()?.rotation();

        let scaled_shift = componentwise_product(shift, scale);
        let delta = [0, 1, 2].map(|i| {
            let rotated: f64 = (0..3)
                .map(|j| -rotation.get(i, j) * scaled_shift[j])
                .sum();
            -(shift[i] + rotated)
        });

        let mut moved = self.clone();
        moved.origin = new_origin.resolve_with(self.origin);
        Ok(moved.translate(delta))
    }

    /// Moves the transform origin and leaves the matrix as it is, so the
    /// element moves on screen if it is rotated or scaled.
    ///
    /// # Errors
    /// Returns an error if the argument can not be parsed.
    pub fn set_origin<'a>(&self, new_origin: impl Into<OriginSpec<'a>>) -> Result<Self> {
        let new_origin = new_origin.into().resolve(self.dimensions)?;
        let mut moved = self.clone();
        moved.origin = new_origin.resolve_with(self.origin);
        Ok(moved)
    }

    /// Post-multiplies by an arbitrary 4x4 matrix. All hints are dropped.
    ///
    /// # Errors
    /// Returns [`TransformError::NotATransform`] if `other` is not 4x4.
    pub fn multiply(&self, other: &Matrix) -> Result<Self> {
        require_4x4(other)?;
        Ok(self.derived(&self.matrix.matrix_multiply(other)?))
    }

    /// Returns the identity transform at the same origin, with the hints that
    /// hold for the identity.
    pub fn reset(&self) -> Self {
        let mut reset = self.derived(&Matrix::identity(4));
        reset.matrix = reset
            .matrix
            .with_cached_determinant(1.0)
            .with_cached_inverse(Matrix::identity(4));
        reset.scale = Some([1.0; 3]);
        reset
    }

    /// Formats the matrix as a `matrix3d(...)` style value with the default
    /// precision.
    pub fn to_css(&self) -> String {
        self.to_css_with_precision(css::DEFAULT_DECIMAL_PLACES)
    }

    pub fn to_css_with_precision(&self, decimal_places: u32) -> String {
        css::format_transform(&self.matrix, decimal_places)
    }

    /// Formats the origin as a `transform-origin` style value.
    pub fn origin_css(&self) -> String {
        css::format_origin(self.origin)
    }

    /// Writes the transform and origin to the element it was read from and
    /// remembers its hints in the cache.
    ///
    /// # Errors
    /// Returns an error if the adapter fails.
    pub fn apply(
        &self,
        adapter: &mut impl ElementAdapter,
        cache: &mut TransformCache,
    ) -> Result<ElementId> {
        self.apply_to(self.element, adapter, cache)
    }

    /// Writes the transform and origin to the given element and remembers
    /// the hints in the cache under that element's identity.
    ///
    /// The cache records the matrix as written, after rounding, so that
    /// reading the element back finds it unchanged. If the origin can not be
    /// written, the element's previous transform is restored before the error
    /// is returned. A failure to restore it is only logged.
    ///
    /// # Errors
    /// Returns an error if the element can not be resolved or the adapter
    /// fails.
    pub fn apply_to<'a>(
        &self,
        target: impl Into<ElementRef<'a>>,
        adapter: &mut impl ElementAdapter,
        cache: &mut TransformCache,
    ) -> Result<ElementId> {
        let element = target.into().resolve(&*adapter)?;

        let transform = self.to_css_with_precision(cache.config().decimal_places);
        let written = css::parse_transform(&transform)?;
        let origin = self.origin_css();

        let id = adapter.ensure_identity(element)?;
        let previous = adapter.read_transform(element)?;

        adapter.write_transform(element, &transform)?;
        if let Err(error) = adapter.write_transform_origin(element, &origin) {
            if let Err(restore_error) = adapter.write_transform(element, &previous) {
                log::warn!("Could not restore transform of element {id}: {restore_error:#}");
            }
            return Err(error.into());
        }

        cache.persist(id, written, self.hints());

        Ok(id)
    }

    fn from_parts(
        matrix: &Matrix,
        origin: [f64; 3],
        element: ElementHandle,
        dimensions: ElementDimensions,
        decomposer: PolarDecomposer,
    ) -> Self {
        Self {
            matrix: matrix.map(snap),
            origin,
            element,
            dimensions,
            decomposer,
            polar_decomposition: OnceLock::new(),
            scale: None,
        }
    }

    /// A transform for the same element and origin with the given matrix and
    /// no hints.
    fn derived(&self, matrix: &Matrix) -> Self {
        Self::from_parts(
            matrix,
            self.origin,
            self.element,
            self.dimensions,
            self.decomposer,
        )
    }

    fn rows(&self) -> [[f64; 4]; 4] {
        matrix_rows(&self.matrix)
    }

    fn diagonal(&self) -> [f64; 3] {
        [0, 1, 2].map(|k| self.matrix.get(k, k))
    }
}

impl DecompositionHints {
    /// Returns these hints with every hint that `overrides` specifies
    /// replaced by it.
    pub fn overridden_by(self, overrides: Self) -> Self {
        Self {
            determinant: overrides.determinant.or(self.determinant),
            inverse: overrides.inverse.or(self.inverse),
            polar_decomposition: overrides.polar_decomposition.or(self.polar_decomposition),
            scale: overrides.scale.or(self.scale),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.determinant.is_none()
            && self.inverse.is_none()
            && self.polar_decomposition.is_none()
            && self.scale.is_none()
    }
}

fn require_4x4(matrix: &Matrix) -> Result<()> {
    if matrix.shape() == (4, 4) {
        Ok(())
    } else {
        Err(TransformError::NotATransform {
            n_rows: matrix.n_rows(),
            n_cols: matrix.n_cols(),
        })
    }
}

/// Copies the top left 4x4 block of the matrix.
fn matrix_rows(matrix: &Matrix) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (row, source) in rows.iter_mut().zip(matrix.rows()) {
        for (value, &source) in row.iter_mut().zip(source) {
            *value = source;
        }
    }
    rows
}

fn multiply_4x4(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut product = [[0.0; 4]; 4];
    for (i, row) in product.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    product
}

fn stretch_diagonal(decomposition: &PolarDecomposition) -> [f64; 3] {
    [0, 1, 2].map(|k| decomposition.stretch().get(k, k))
}

fn componentwise_product(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2]]
}
