//! The boundary to the system holding the visual elements.

use crate::{Result, TransformError};
use std::{
    fmt,
    hash::{self, Hash},
};

/// Reference to an element, issued by an [`ElementAdapter`]. Only meaningful
/// to the adapter that issued it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

/// Stable identity of an element, assigned by an [`ElementAdapter`] the first
/// time a transform is applied to it. Used to key the
/// [`TransformCache`](crate::TransformCache).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElementId(u64);

/// Layout size of an element in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementDimensions {
    pub width: f64,
    pub height: f64,
}

/// An element given either directly or through a selector that the adapter
/// resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementRef<'a> {
    Element(ElementHandle),
    Selector(&'a str),
}

/// Access to the elements whose transforms are manipulated.
///
/// Implementations perform whatever I/O is needed to reach the elements,
/// including resolving vendor-prefixed style properties, and report failures
/// as [`anyhow::Error`]s.
pub trait ElementAdapter {
    /// Finds the element matching `selector`, if any.
    fn query_selector(&self, selector: &str) -> anyhow::Result<Option<ElementHandle>>;

    /// Returns the layout size of the element.
    fn dimensions(&self, element: ElementHandle) -> anyhow::Result<ElementDimensions>;

    /// Returns the element's computed `transform` value.
    fn read_transform(&self, element: ElementHandle) -> anyhow::Result<String>;

    /// Returns the element's computed `transform-origin` value.
    fn read_transform_origin(&self, element: ElementHandle) -> anyhow::Result<String>;

    fn write_transform(&mut self, element: ElementHandle, value: &str) -> anyhow::Result<()>;

    fn write_transform_origin(&mut self, element: ElementHandle, value: &str)
    -> anyhow::Result<()>;

    /// Returns the identity previously assigned to the element, without
    /// assigning one.
    fn identity(&self, element: ElementHandle) -> anyhow::Result<Option<ElementId>>;

    /// Returns the identity of the element, assigning a new one the first
    /// time the element is seen.
    fn ensure_identity(&mut self, element: ElementHandle) -> anyhow::Result<ElementId>;
}

impl ElementHandle {
    #[inline]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl ElementId {
    /// Converts the given `u64` into an element ID. Should only be called
    /// with values returned from [`Self::as_u64`].
    #[inline]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Hash for ElementId {
    #[inline]
    fn hash<H: hash::Hasher>(&self, hasher: &mut H) {
        hasher.write_u64(self.0);
    }
}

impl nohash_hasher::IsEnabled for ElementId {}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ElementDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl ElementRef<'_> {
    /// Resolves the reference to a handle through the given adapter.
    ///
    /// # Errors
    /// Returns [`TransformError::InvalidElementArgument`] for a blank selector,
    /// [`TransformError::ElementNotFound`] if the selector matches nothing and
    /// [`TransformError::Adapter`] if the lookup itself fails.
    pub fn resolve(self, adapter: &impl ElementAdapter) -> Result<ElementHandle> {
        match self {
            Self::Element(handle) => Ok(handle),
            Self::Selector(selector) => {
                let selector = selector.trim();
                if selector.is_empty() {
                    return Err(TransformError::InvalidElementArgument);
                }
                adapter
                    .query_selector(selector)?
                    .ok_or_else(|| TransformError::ElementNotFound {
                        selector: selector.to_string(),
                    })
            }
        }
    }
}

impl From<ElementHandle> for ElementRef<'_> {
    fn from(handle: ElementHandle) -> Self {
        Self::Element(handle)
    }
}

impl<'a> From<&'a str> for ElementRef<'a> {
    fn from(selector: &'a str) -> Self {
        Self::Selector(selector)
    }
}

impl<'a> From<&'a String> for ElementRef<'a> {
    fn from(selector: &'a String) -> Self {
        Self::Selector(selector)
    }
}
