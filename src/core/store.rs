//! Immutable snapshot of every loaded record.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::warn;

use crate::{
    records::{AnnotationRecord, SourceRecord, TextRecord, WitnessRecord},
    types::{
        AnnotationType, AnnotationUniqueId, DEFAULT_MAX_LINEAGE_DEPTH, SourceId, TextId, WitnessId,
    },
};

use super::{collection::Collection, oplog::AnnotationOperations};

/// Busy indicators driven by the loading/loaded intent pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadFlags {
    /// Initial data request in flight.
    pub loading_initial_data: bool,
    /// Initial data delivered.
    pub loaded_initial_data: bool,
    /// Text list request in flight.
    pub loading_texts: bool,
    /// Text list delivered.
    pub loaded_texts: bool,
    /// Source list request in flight.
    pub loading_sources: bool,
    /// Source list delivered.
    pub loaded_sources: bool,
    /// Witness request in flight.
    pub loading_witnesses: bool,
    /// Witnesses delivered.
    pub loaded_witnesses: bool,
    /// Annotations or their operations still outstanding.
    pub loading_annotations: bool,
    /// Annotations delivered.
    pub loaded_annotations: bool,
    /// Operation log delivered.
    pub loaded_annotation_operations: bool,
}

/// Immutable snapshot of every loaded record plus the operation logs.
///
/// Mutators take `&self` and return the next snapshot; sub-collections that
/// did not change are shared with the previous one.
#[derive(Debug, Clone, Default)]
pub struct DataState {
    pub(crate) texts: Collection<TextRecord>,
    pub(crate) sources: Collection<SourceRecord>,
    pub(crate) witnesses: Collection<WitnessRecord>,
    pub(crate) text_witnesses: Arc<HashMap<TextId, Collection<WitnessRecord>>>,
    pub(crate) witness_annotations: Arc<HashMap<WitnessId, Collection<AnnotationRecord>>>,
    pub(crate) witness_operations: Arc<HashMap<WitnessId, AnnotationOperations>>,
    pub(crate) flags: LoadFlags,
}

impl DataState {
    /// Empty snapshot with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current loading flags.
    pub fn flags(&self) -> LoadFlags {
        self.flags
    }

    pub(crate) fn with_flags(&self, update: impl FnOnce(&mut LoadFlags)) -> Self {
        let mut next = self.clone();
        update(&mut next.flags);
        next
    }

    /// Replaces every text record.
    pub fn with_texts(&self, texts: Vec<TextRecord>) -> Self {
        Self {
            texts: Collection::from_records(texts),
            ..self.clone()
        }
    }

    /// Replaces every source record.
    pub fn with_sources(&self, sources: Vec<SourceRecord>) -> Self {
        Self {
            sources: Collection::from_records(sources),
            ..self.clone()
        }
    }

    /// Replaces the witness set of `text_id`, keeping the flattened
    /// all-witnesses mapping in step. The per-text grouping is kept in
    /// ascending id order.
    pub fn with_text_witnesses(&self, text_id: TextId, mut witnesses: Vec<WitnessRecord>) -> Self {
        witnesses.sort_by_key(|w| w.id);

        let mut all = self.witnesses.clone();
        for witness in &witnesses {
            all = all.merged(witness.clone());
        }

        let mut next = self.clone();
        next.witnesses = all;
        Arc::make_mut(&mut next.text_witnesses).insert(text_id, Collection::from_records(witnesses));
        next
    }

    /// Replaces the annotation collection of `witness_id`.
    pub fn with_witness_annotations(
        &self,
        witness_id: WitnessId,
        annotations: Vec<AnnotationRecord>,
    ) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.witness_annotations)
            .insert(witness_id, Collection::from_records(annotations));
        next
    }

    /// Upserts one annotation record under its witness, keyed by unique id.
    pub fn with_annotation(&self, record: AnnotationRecord) -> Self {
        let witness_id = record.witness_id;
        let current = self
            .witness_annotations
            .get(&witness_id)
            .cloned()
            .unwrap_or_default();

        let mut next = self.clone();
        Arc::make_mut(&mut next.witness_annotations).insert(witness_id, current.merged(record));
        next
    }

    /// Removes one annotation record. An unknown witness gets an empty collection.
    pub fn without_annotation(&self, witness_id: WitnessId, unique_id: &AnnotationUniqueId) -> Self {
        let remaining = match self.witness_annotations.get(&witness_id) {
            Some(annotations) => annotations.without(unique_id),
            None => Collection::default(),
        };

        let mut next = self.clone();
        Arc::make_mut(&mut next.witness_annotations).insert(witness_id, remaining);
        next
    }

    /// Every loaded text.
    pub fn texts(&self) -> &Collection<TextRecord> {
        &self.texts
    }

    /// Text record by id.
    pub fn text_record(&self, text_id: TextId) -> Option<&TextRecord> {
        self.texts.get(&text_id)
    }

    /// Every loaded source, in load order.
    pub fn sources(&self) -> &Collection<SourceRecord> {
        &self.sources
    }

    /// Source record by id.
    pub fn source_record(&self, source_id: SourceId) -> Option<&SourceRecord> {
        self.sources.get(&source_id)
    }

    /// Every loaded witness across all texts.
    pub fn witnesses(&self) -> &Collection<WitnessRecord> {
        &self.witnesses
    }

    /// Witness record by id.
    pub fn witness_data(&self, witness_id: WitnessId) -> Option<&WitnessRecord> {
        self.witnesses.get(&witness_id)
    }

    /// Witness records loaded for `text_id`, in ascending id order.
    pub fn text_witness_records(&self, text_id: TextId) -> Option<&Collection<WitnessRecord>> {
        self.text_witnesses.get(&text_id)
    }

    /// Annotation records of `witness_id`, in load order.
    pub fn witness_annotations(&self, witness_id: WitnessId) -> Option<&Collection<AnnotationRecord>> {
        self.witness_annotations.get(&witness_id)
    }

    /// One annotation record of `witness_id` by unique id.
    pub fn annotation_data(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<&AnnotationRecord> {
        self.witness_annotations.get(&witness_id)?.get(unique_id)
    }

    /// Annotations of `witness_id` matching `annotation_type`, and `creator_witness_id`
    /// when given. Without a type every annotation of the witness is returned.
    pub fn annotations_by_type_and_creator(
        &self,
        witness_id: WitnessId,
        annotation_type: Option<AnnotationType>,
        creator_witness_id: Option<WitnessId>,
    ) -> Vec<&AnnotationRecord> {
        let Some(annotations) = self.witness_annotations.get(&witness_id) else {
            return Vec::new();
        };
        let Some(annotation_type) = annotation_type else {
            return annotations.iter().collect();
        };

        annotations
            .iter()
            .filter(|a| a.annotation_type == annotation_type)
            .filter(|a| creator_witness_id.is_none_or(|c| a.creator_witness_id == Some(c)))
            .collect()
    }

    /// Follows `original` links from `unique_id` to the root record, giving up
    /// after [`DEFAULT_MAX_LINEAGE_DEPTH`] links.
    ///
    /// Returns `None` when any link in the chain points at a missing record.
    pub fn original_annotation_data(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<&AnnotationRecord> {
        self.original_annotation_data_within(witness_id, unique_id, DEFAULT_MAX_LINEAGE_DEPTH)
    }

    /// Like [`DataState::original_annotation_data`], following at most
    /// `max_depth` links.
    pub fn original_annotation_data_within(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
        max_depth: usize,
    ) -> Option<&AnnotationRecord> {
        let mut record = self.annotation_data(witness_id, unique_id)?;
        for _ in 0..max_depth {
            let Some(original) = record.original.as_ref() else {
                break;
            };
            record = self.annotation_data(witness_id, original)?;
        }
        if record.original.is_none() {
            return Some(record);
        }

        warn!(
            witness_id,
            unique_id = %unique_id,
            max_depth,
            "original chain exceeds depth limit"
        );
        None
    }

    /// True when the root of the annotation's lineage was created by a user.
    pub fn is_originally_user_created(&self, witness_id: WitnessId, unique_id: &AnnotationUniqueId) -> bool {
        self.is_originally_user_created_within(witness_id, unique_id, DEFAULT_MAX_LINEAGE_DEPTH)
    }

    /// Like [`DataState::is_originally_user_created`], following at most
    /// `max_depth` links.
    pub fn is_originally_user_created_within(
        &self,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
        max_depth: usize,
    ) -> bool {
        self.original_annotation_data_within(witness_id, unique_id, max_depth)
            .is_some_and(|root| root.creator_user_id.is_some())
    }
}
