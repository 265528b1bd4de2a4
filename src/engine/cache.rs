//! Cache of resolved witnesses.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::{domain::Witness, types::WitnessId};

/// Resolved witnesses, which carry the full content body and are expensive to
/// rebuild. Entries are only dropped through [`WitnessCache::invalidate`] or
/// [`WitnessCache::clear`].
#[derive(Debug, Default)]
pub struct WitnessCache {
    entries: HashMap<WitnessId, Arc<Witness>>,
}

impl WitnessCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached witness, whatever its revision.
    pub fn get(&self, id: WitnessId) -> Option<&Arc<Witness>> {
        self.entries.get(&id)
    }

    /// Stores `witness` under its id, replacing any previous entry.
    pub fn insert(&mut self, witness: Arc<Witness>) {
        self.entries.insert(witness.id, witness);
    }

    /// Drops `id`. Returns true when an entry was present.
    pub fn invalidate(&mut self, id: WitnessId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached witnesses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
