//! Validation cache keyed by document identity.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, info};

use crate::{CacheEntry, SchemaDependencies};

/// Remembers the outcome of the last validation pass of every document, and
/// which schema each dependent document was validated against.
#[derive(Debug, Clone)]
pub struct ValidationCache<K> {
    /// In-memory cache entries.
    entries: HashMap<K, CacheEntry>,
    /// Schema -> dependents index, cleared together with `entries`.
    dependencies: SchemaDependencies<K>,
    /// Whether cache is enabled.
    enabled: bool,
}

impl<K> ValidationCache<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Creates a new, enabled, empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            dependencies: SchemaDependencies::new(),
            enabled: true,
        }
    }

    /// Disables caching. Every `check` reports a miss until re-enabled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Enables caching.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Returns whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the stored outcome for `id` if it was computed for `version`.
    ///
    /// `None` means the outcome is unknown and the document must be checked.
    pub fn check(&self, id: &K, version: i32) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }
        self.entries
            .get(id)
            .filter(|entry| entry.is_valid(version))
            .copied()
    }

    /// Stores the outcome for `id`, overwriting any previous entry.
    pub fn store(&mut self, id: K, version: i32, valid: bool) {
        if self.enabled {
            self.entries.insert(id, CacheEntry::new(version, valid));
        }
    }

    /// Removes the cache entry for `id`. Dependency associations are kept.
    pub fn remove(&mut self, id: &K) -> Option<CacheEntry> {
        self.entries.remove(id)
    }

    /// Clears all cache entries and all schema associations.
    pub fn clear(&mut self) {
        info!(
            "Clearing {} cache entries and {} schema associations",
            self.entries.len(),
            self.dependencies.len()
        );
        self.entries.clear();
        self.dependencies.clear();
    }

    /// Records that `dependent` was validated against `schema`.
    pub fn associate(&mut self, schema: K, dependent: K) {
        self.dependencies.associate(schema, dependent);
    }

    /// Returns the schema dependency index.
    pub fn dependencies(&self) -> &SchemaDependencies<K> {
        &self.dependencies
    }

    /// Evicts the cache entries of every document associated with `schema`
    /// and returns those documents so they can be validated again.
    pub fn invalidate_dependents(&mut self, schema: &K) -> Vec<K> {
        let dependents: Vec<K> = self.dependencies.dependents_of(schema).into_iter().collect();
        for dependent in &dependents {
            self.entries.remove(dependent);
        }
        debug!(
            "Invalidated {} dependents of {:?}",
            dependents.len(),
            schema
        );
        dependents
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> Default for ValidationCache<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
