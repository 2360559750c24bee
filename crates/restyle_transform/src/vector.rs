//! Vectors with optionally unspecified components.

/// A 3-vector where each component may be left unspecified.
///
/// Operations decide what an unspecified component means: relative
/// translation treats it as `0`, scaling as `1`, and origin changes keep the
/// previous value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartialVector3 {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl PartialVector3 {
    pub const fn new(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self { x, y, z }
    }

    /// A vector with no specified components.
    pub const fn unspecified() -> Self {
        Self::new(None, None, None)
    }

    /// Returns the components as an array.
    pub fn components(&self) -> [Option<f64>; 3] {
        [self.x, self.y, self.z]
    }

    /// Fills unspecified components with `default`.
    pub fn resolve(&self, default: f64) -> [f64; 3] {
        self.components()
            .map(|component| component.unwrap_or(default))
    }

    /// Fills unspecified components with the corresponding component of
    /// `fallback`.
    pub fn resolve_with(&self, fallback: [f64; 3]) -> [f64; 3] {
        let mut resolved = fallback;
        for (resolved, component) in resolved.iter_mut().zip(self.components()) {
            if let Some(component) = component {
                *resolved = component;
            }
        }
        resolved
    }
}

impl From<[Option<f64>; 3]> for PartialVector3 {
    fn from([x, y, z]: [Option<f64>; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<f64> for PartialVector3 {
    fn from(x: f64) -> Self {
        Self::new(Some(x), None, None)
    }
}

impl From<[f64; 1]> for PartialVector3 {
    fn from([x]: [f64; 1]) -> Self {
        Self::new(Some(x), None, None)
    }
}

impl From<[f64; 2]> for PartialVector3 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(Some(x), Some(y), None)
    }
}

impl From<[f64; 3]> for PartialVector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(Some(x), Some(y), Some(z))
    }
}

impl From<(f64, f64)> for PartialVector3 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(Some(x), Some(y), None)
    }
}

impl From<(f64, f64, f64)> for PartialVector3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(Some(x), Some(y), Some(z))
    }
}

/// Takes up to the first three values; the rest are ignored.
impl From<&[f64]> for PartialVector3 {
    fn from(values: &[f64]) -> Self {
        let mut components = [None; 3];
        for (component, &value) in components.iter_mut().zip(values) {
            *component = Some(value);
        }
        components.into()
    }
}
