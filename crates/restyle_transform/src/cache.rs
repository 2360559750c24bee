//! Registry of decomposition hints for elements.

use crate::{
    Result, config::TransformConfig, element::ElementId, transform::DecompositionHints,
};
use nohash_hasher::BuildNoHashHasher;
use restyle_math::Matrix;
use std::collections::HashMap;

type NoHashMap<K, V> = HashMap<K, V, BuildNoHashHasher<K>>;

/// Remembers, for every element a transform has been applied to, the applied
/// matrix and the decomposition hints known for it at the time.
///
/// When the transform of an element is read back, the hints let rotation and
/// scale be recovered without decomposing the combined matrix again. The
/// cache is owned by the caller, who is also responsible for evicting entries
/// of elements that go away.
#[derive(Debug, Default)]
pub struct TransformCache {
    entries: NoHashMap<ElementId, CachedTransform>,
    config: TransformConfig,
}

/// The state of an element's transform when it was last applied.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedTransform {
    matrix: Matrix,
    hints: DecompositionHints,
}

impl TransformCache {
    /// Creates an empty cache with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: TransformConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: NoHashMap::default(),
            config,
        })
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Returns the hints cached for the element, provided the matrix they were
    /// recorded for matches `matrix` to within the configured tolerance.
    /// A mismatch means the element's transform was changed behind the
    /// cache's back, so the hints no longer apply.
    pub fn lookup(&self, id: ElementId, matrix: &Matrix) -> Option<&DecompositionHints> {
        let entry = self.entries.get(&id)?;
        if entry
            .matrix
            .equals(matrix, self.config.cache_match_tolerance)
        {
            log::debug!("Seeding transform of element {id} from cache");
            Some(&entry.hints)
        } else {
            log::debug!("Ignoring stale cached transform for element {id}");
            None
        }
    }

    /// Records the matrix applied to the element along with its hints,
    /// replacing any previous entry.
    pub fn persist(&mut self, id: ElementId, matrix: Matrix, hints: DecompositionHints) {
        log::debug!("Caching transform of element {id}");
        self.entries
            .insert(id, CachedTransform { matrix, hints });
    }

    /// Returns the entry for the element, whether or not it is stale.
    pub fn get(&self, id: ElementId) -> Option<&CachedTransform> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Removes and returns the entry for the element.
    pub fn evict(&mut self, id: ElementId) -> Option<CachedTransform> {
        let entry = self.entries.remove(&id);
        if entry.is_some() {
            log::debug!("Evicted cached transform of element {id}");
        }
        entry
    }

    /// Evicts every entry for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementId, &CachedTransform) -> bool) {
        let n_entries = self.entries.len();
        self.entries.retain(|&id, entry| keep(id, entry));
        log::debug!(
            "Evicted {} cached transforms",
            n_entries - self.entries.len()
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CachedTransform {
    /// The matrix as it was written to the element, after rounding for output.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn hints(&self) -> &DecompositionHints {
        &self.hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_hints(scale: [f64; 3]) -> DecompositionHints {
        DecompositionHints {
            scale: Some(scale),
            ..Default::default()
        }
    }

    #[test]
    fn creating_cache_with_invalid_config_fails() {
        assert!(
            TransformCache::new(TransformConfig {
                cache_match_tolerance: f64::NAN,
                ..Default::default()
            })
            .is_err()
        );
    }

    #[test]
    fn lookup_of_unknown_element_gives_nothing() {
        let cache = TransformCache::default();
        assert!(
            cache
                .lookup(ElementId::from_u64(0), &Matrix::identity(4))
                .is_none()
        );
    }

    #[test]
    fn lookup_with_matching_matrix_gives_hints() {
        let mut cache = TransformCache::default();
        let id = ElementId::from_u64(3);
        let matrix = Matrix::from_diagonal(&[2.0, 2.0, 2.0, 1.0]);
        cache.persist(id, matrix.clone(), scale_hints([2.0; 3]));

        let nearly_same = matrix.with_value(0, 3, 4e-7);
        assert_eq!(
            cache.lookup(id, &nearly_same),
            Some(&scale_hints([2.0; 3]))
        );
    }

    #[test]
    fn lookup_with_changed_matrix_gives_nothing() {
        let mut cache = TransformCache::default();
        let id = ElementId::from_u64(3);
        cache.persist(id, Matrix::identity(4), scale_hints([1.0; 3]));

        assert!(
            cache
                .lookup(id, &Matrix::identity(4).with_value(0, 3, 1.0))
                .is_none()
        );
        assert!(cache.contains(id));
    }

    #[test]
    fn persisting_replaces_entry() {
        let mut cache = TransformCache::default();
        let id = ElementId::from_u64(1);
        cache.persist(id, Matrix::identity(4), scale_hints([1.0; 3]));
        cache.persist(id, Matrix::identity(4), scale_hints([3.0; 3]));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(id).unwrap().hints(), &scale_hints([3.0; 3]));
    }

    #[test]
    fn evicting_removes_entry() {
        let mut cache = TransformCache::default();
        let id = ElementId::from_u64(1);
        cache.persist(id, Matrix::identity(4), DecompositionHints::default());

        assert!(cache.evict(id).is_some());
        assert!(cache.evict(id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn retaining_evicts_rejected_entries() {
        let mut cache = TransformCache::default();
        for idx in 0..6 {
            cache.persist(
                ElementId::from_u64(idx),
                Matrix::identity(4),
                DecompositionHints::default(),
            );
        }

        cache.retain(|id, _| id.as_u64() % 2 == 0);

        assert_eq!(cache.len(), 3);
        assert!(cache.contains(ElementId::from_u64(4)));
        assert!(!cache.contains(ElementId::from_u64(5)));

        cache.clear();
        assert!(cache.is_empty());
    }
}
