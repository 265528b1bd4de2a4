//! Per-witness log of applied and removed annotations.

use std::sync::{Arc, OnceLock};

use hashbrown::HashSet;

use crate::{
    records::AnnotationOperationRecord,
    types::{AnnotationOp, AnnotationUniqueId, WitnessId},
};

use super::store::DataState;

/// Applied/removed buckets of one witness's operation log.
///
/// An id may linger in the opposite bucket; readers only consult the bucket
/// they care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationOperations {
    applied: Arc<HashSet<AnnotationUniqueId>>,
    removed: Arc<HashSet<AnnotationUniqueId>>,
}

impl AnnotationOperations {
    /// Builds both buckets from server rows.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AnnotationOperationRecord>) -> Self {
        let mut applied = HashSet::new();
        let mut removed = HashSet::new();
        for record in records {
            let bucket = match record.operation {
                AnnotationOp::Applied => &mut applied,
                AnnotationOp::Removed => &mut removed,
            };
            bucket.insert(record.annotation_unique_id.clone());
        }
        Self {
            applied: Arc::new(applied),
            removed: Arc::new(removed),
        }
    }

    /// Unique ids explicitly applied.
    pub fn applied(&self) -> &HashSet<AnnotationUniqueId> {
        &self.applied
    }

    /// Unique ids of default annotations explicitly removed.
    pub fn removed(&self) -> &HashSet<AnnotationUniqueId> {
        &self.removed
    }
}

fn empty_bucket() -> &'static HashSet<AnnotationUniqueId> {
    static EMPTY: OnceLock<HashSet<AnnotationUniqueId>> = OnceLock::new();
    EMPTY.get_or_init(HashSet::new)
}

impl DataState {
    /// Annotations explicitly applied on `witness_id`. Empty for unknown witnesses.
    pub fn applied_annotations(&self, witness_id: WitnessId) -> &HashSet<AnnotationUniqueId> {
        self.witness_operations
            .get(&witness_id)
            .map(AnnotationOperations::applied)
            .unwrap_or(empty_bucket())
    }

    /// Default annotations explicitly removed on `witness_id`. Empty for unknown witnesses.
    pub fn removed_default_annotations(&self, witness_id: WitnessId) -> &HashSet<AnnotationUniqueId> {
        self.witness_operations
            .get(&witness_id)
            .map(AnnotationOperations::removed)
            .unwrap_or(empty_bucket())
    }

    /// True when `unique_id` is in the applied bucket of `witness_id`.
    pub fn is_applied(&self, witness_id: WitnessId, unique_id: &AnnotationUniqueId) -> bool {
        self.applied_annotations(witness_id).contains(unique_id)
    }

    /// True when `unique_id` is in the removed bucket of `witness_id`.
    pub fn is_removed(&self, witness_id: WitnessId, unique_id: &AnnotationUniqueId) -> bool {
        self.removed_default_annotations(witness_id).contains(unique_id)
    }

    /// True once buckets exist for `witness_id`.
    pub fn has_operations(&self, witness_id: WitnessId) -> bool {
        self.witness_operations.contains_key(&witness_id)
    }

    /// Marks `unique_id` applied. `None` when it already is.
    pub fn record_applied(&self, witness_id: WitnessId, unique_id: &AnnotationUniqueId) -> Option<Self> {
        if self.is_applied(witness_id, unique_id) {
            return None;
        }
        Some(self.with_operations(witness_id, |ops| {
            Arc::make_mut(&mut ops.applied).insert(unique_id.clone());
        }))
    }

    /// Drops `unique_id` from the applied bucket. `None` when it was not there.
    pub fn record_removed_applied(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<Self> {
        if !self.is_applied(witness_id, unique_id) {
            return None;
        }
        Some(self.with_operations(witness_id, |ops| {
            Arc::make_mut(&mut ops.applied).remove(unique_id);
        }))
    }

    /// Records that a default annotation was removed, clearing any applied entry.
    ///
    /// `None` when buckets exist and already reflect the removal.
    pub fn record_removed_default(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<Self> {
        if self.has_operations(witness_id)
            && self.is_removed(witness_id, unique_id)
            && !self.is_applied(witness_id, unique_id)
        {
            return None;
        }
        Some(self.with_operations(witness_id, |ops| {
            if ops.applied.contains(unique_id) {
                Arc::make_mut(&mut ops.applied).remove(unique_id);
            }
            Arc::make_mut(&mut ops.removed).insert(unique_id.clone());
        }))
    }

    /// Restores a previously removed default annotation.
    ///
    /// `None` when buckets exist and `unique_id` is not in the removed bucket.
    pub fn record_applied_default(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<Self> {
        if self.has_operations(witness_id) && !self.is_removed(witness_id, unique_id) {
            return None;
        }
        Some(self.with_operations(witness_id, |ops| {
            if ops.removed.contains(unique_id) {
                Arc::make_mut(&mut ops.removed).remove(unique_id);
            }
        }))
    }

    /// Replaces both buckets of `witness_id` with the given rows.
    pub fn with_loaded_operations(
        &self,
        witness_id: WitnessId,
        records: &[AnnotationOperationRecord],
    ) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.witness_operations)
            .insert(witness_id, AnnotationOperations::from_records(records));
        next
    }

    /// Copy-on-write edit of one witness's buckets, creating them when missing.
    fn with_operations(&self, witness_id: WitnessId, edit: impl FnOnce(&mut AnnotationOperations)) -> Self {
        let mut ops = self
            .witness_operations
            .get(&witness_id)
            .cloned()
            .unwrap_or_default();
        edit(&mut ops);

        let mut next = self.clone();
        Arc::make_mut(&mut next.witness_operations).insert(witness_id, ops);
        next
    }
}
