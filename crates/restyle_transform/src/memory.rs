//! In-memory element adapter.

use crate::element::{ElementAdapter, ElementDimensions, ElementHandle, ElementId};
use anyhow::{Result, anyhow};

/// An [`ElementAdapter`] keeping elements and their style strings in memory.
///
/// Elements start out untransformed, with the transform origin at their
/// center as for a freshly laid out element.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    elements: Vec<Option<MemoryElement>>,
    id_counter: u64,
}

/// An element held by a [`MemoryAdapter`].
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryElement {
    selector: String,
    dimensions: ElementDimensions,
    transform: String,
    transform_origin: String,
    id: Option<ElementId>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element that can be found with the given selector and returns
    /// its handle.
    pub fn insert(
        &mut self,
        selector: impl Into<String>,
        dimensions: ElementDimensions,
    ) -> ElementHandle {
        let handle = ElementHandle::from_u64(self.elements.len() as u64);
        self.elements.push(Some(MemoryElement {
            selector: selector.into(),
            dimensions,
            transform: "none".to_string(),
            transform_origin: format!(
                "{}px {}px 0px",
                0.5 * dimensions.width,
                0.5 * dimensions.height
            ),
            id: None,
        }));
        handle
    }

    /// Returns the element with the given handle, if it is present.
    pub fn element(&self, element: ElementHandle) -> Option<&MemoryElement> {
        self.elements
            .get(element.as_u64() as usize)
            .and_then(Option::as_ref)
    }

    /// Removes the element with the given handle and returns it. The handle
    /// is not reused.
    pub fn remove(&mut self, element: ElementHandle) -> Option<MemoryElement> {
        self.elements
            .get_mut(element.as_u64() as usize)
            .and_then(Option::take)
    }

    /// The number of elements present.
    pub fn len(&self) -> usize {
        self.elements.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn existing(&self, element: ElementHandle) -> Result<&MemoryElement> {
        self.element(element)
            .ok_or_else(|| anyhow!("No element with handle {}", element.as_u64()))
    }

    fn existing_mut(&mut self, element: ElementHandle) -> Result<&mut MemoryElement> {
        self.elements
            .get_mut(element.as_u64() as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| anyhow!("No element with handle {}", element.as_u64()))
    }
}

impl ElementAdapter for MemoryAdapter {
    fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self
            .elements
            .iter()
            .position(|element| {
                element
                    .as_ref()
                    .is_some_and(|element| element.selector == selector)
            })
            .map(|idx| ElementHandle::from_u64(idx as u64)))
    }

    fn dimensions(&self, element: ElementHandle) -> Result<ElementDimensions> {
        Ok(self.existing(element)?.dimensions)
    }

    fn read_transform(&self, element: ElementHandle) -> Result<String> {
        Ok(self.existing(element)?.transform.clone())
    }

    fn read_transform_origin(&self, element: ElementHandle) -> Result<String> {
        Ok(self.existing(element)?.transform_origin.clone())
    }

    fn write_transform(&mut self, element: ElementHandle, value: &str) -> Result<()> {
        value.clone_into(&mut self.existing_mut(element)?.transform);
        Ok(())
    }

    fn write_transform_origin(&mut self, element: ElementHandle, value: &str) -> Result<()> {
        value.clone_into(&mut self.existing_mut(element)?.transform_origin);
        Ok(())
    }

    fn identity(&self, element: ElementHandle) -> Result<Option<ElementId>> {
        Ok(self.existing(element)?.id)
    }

    fn ensure_identity(&mut self, element: ElementHandle) -> Result<ElementId> {
        let next_id = ElementId::from_u64(self.id_counter);
        let existing = self.existing_mut(element)?;
        if let Some(id) = existing.id {
            return Ok(id);
        }
        existing.id = Some(next_id);
        self.id_counter += 1;
        Ok(next_id)
    }
}

impl MemoryElement {
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn dimensions(&self) -> ElementDimensions {
        self.dimensions
    }

    /// The current `transform` style value.
    pub fn transform(&self) -> &str {
        &self.transform
    }

    /// The current `transform-origin` style value.
    pub fn transform_origin(&self) -> &str {
        &self.transform_origin
    }

    /// The identity assigned to the element, if any.
    pub fn id(&self) -> Option<ElementId> {
        self.id
    }
}
