//! Schema dependency index.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::debug;

/// Maps a schema document to the documents last validated against it.
///
/// A document depends on at most one schema at a time. Associating it with a
/// new schema removes it from the set of the schema it was previously
/// associated with.
#[derive(Debug, Clone)]
pub struct SchemaDependencies<K> {
    /// Schema -> dependents.
    dependents: HashMap<K, HashSet<K>>,
    /// Dependent -> schema (reverse pointer).
    schema_of: HashMap<K, K>,
}

impl<K> SchemaDependencies<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            dependents: HashMap::new(),
            schema_of: HashMap::new(),
        }
    }

    /// Records that `dependent` was validated against `schema`.
    ///
    /// Adding the same pair twice is a no-op.
    pub fn associate(&mut self, schema: K, dependent: K) {
        if let Some(previous) = self.schema_of.get(&dependent)
            && *previous != schema
        {
            debug!(
                "Moving {:?} from schema {:?} to {:?}",
                dependent, previous, schema
            );
            if let Some(set) = self.dependents.get_mut(previous) {
                set.remove(&dependent);
                if set.is_empty() {
                    self.dependents.remove(previous);
                }
            }
        }

        self.schema_of.insert(dependent.clone(), schema.clone());
        self.dependents.entry(schema).or_default().insert(dependent);
    }

    /// Returns the documents associated with `schema` (empty if none).
    pub fn dependents_of(&self, schema: &K) -> HashSet<K> {
        self.dependents.get(schema).cloned().unwrap_or_default()
    }

    /// Returns the schema `dependent` was last validated against.
    pub fn schema_of(&self, dependent: &K) -> Option<&K> {
        self.schema_of.get(dependent)
    }

    /// Removes every association.
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.schema_of.clear();
    }

    /// Returns the number of schemas with at least one dependent.
    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    /// Returns true if no associations are recorded.
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

impl<K> Default for SchemaDependencies<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
