//! Keyed record collections shared between snapshots.

use std::{hash::Hash, sync::Arc};

use indexmap::IndexMap;

use crate::{
    records::{AnnotationRecord, SourceRecord, TextRecord, WitnessRecord},
    types::{AnnotationUniqueId, SourceId, TextId, WitnessId},
};

/// A raw record stored in a [`Collection`] under its normalizing key.
pub trait Record: Clone {
    /// Key type the collection is normalized on.
    type Key: Clone + Eq + Hash;

    /// Returns the normalizing key.
    fn key(&self) -> Self::Key;
}

impl Record for TextRecord {
    type Key = TextId;

    fn key(&self) -> TextId {
        self.id
    }
}

impl Record for SourceRecord {
    type Key = SourceId;

    fn key(&self) -> SourceId {
        self.id
    }
}

impl Record for WitnessRecord {
    type Key = WitnessId;

    fn key(&self) -> WitnessId {
        self.id
    }
}

impl Record for AnnotationRecord {
    type Key = AnnotationUniqueId;

    fn key(&self) -> AnnotationUniqueId {
        self.unique_id.clone()
    }
}

/// Insertion-ordered, copy-on-write mapping of key to record.
///
/// Every mutator returns a new collection and leaves `self` untouched. Clones
/// share storage until one of them is changed.
#[derive(Debug)]
pub struct Collection<R: Record> {
    by_key: Arc<IndexMap<R::Key, R>>,
}

impl<R: Record> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            by_key: Arc::clone(&self.by_key),
        }
    }
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self {
            by_key: Arc::new(IndexMap::new()),
        }
    }
}

impl<R: Record> Collection<R> {
    /// Builds a collection from `records`.
    ///
    /// A key seen twice keeps the position of its first occurrence and the
    /// value of its last.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let by_key = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            by_key: Arc::new(by_key),
        }
    }

    /// Returns a copy with `record` upserted. A replaced record keeps its position.
    pub fn merged(&self, record: R) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.by_key).insert(record.key(), record);
        next
    }

    /// Returns a copy without `key`, sharing storage when `key` is absent.
    pub fn without(&self, key: &R::Key) -> Self {
        if !self.by_key.contains_key(key) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.by_key).shift_remove(key);
        next
    }

    /// Record stored under `key`.
    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.by_key.get(key)
    }

    /// True when a record is stored under `key`.
    pub fn contains_key(&self, key: &R::Key) -> bool {
        self.by_key.contains_key(key)
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &R> + ExactSizeIterator {
        self.by_key.values()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &R::Key> {
        self.by_key.keys()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// True when no record is stored.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// True when both collections share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.by_key, &other.by_key)
    }
}
