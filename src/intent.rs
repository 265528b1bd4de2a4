//! Named events that drive every store transition.

use crate::{
    domain::Annotation,
    records::{AnnotationOperationRecord, AnnotationRecord, SourceRecord, TextRecord, WitnessRecord},
    types::{AnnotationUniqueId, WitnessId},
};

/// A discrete event with its payload, applied by [`crate::core::reducer::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Initial data request issued.
    LoadingInitialData,
    /// Initial data request completed.
    LoadedInitialData,
    /// Text list request issued.
    LoadingTexts,
    /// Text list delivered.
    LoadedTexts {
        /// Every text in the corpus.
        texts: Vec<TextRecord>,
    },
    /// Source list request issued.
    LoadingSources,
    /// Source list delivered.
    LoadedSources {
        /// Every known source.
        sources: Vec<SourceRecord>,
    },
    /// Witness request issued for a text.
    LoadingWitnesses {
        /// Text whose witnesses are requested.
        text: TextRecord,
    },
    /// Witnesses of a text delivered.
    LoadedWitnesses {
        /// Owning text.
        text: TextRecord,
        /// Complete witness set of the text.
        witnesses: Vec<WitnessRecord>,
    },
    /// Annotation request issued for a witness.
    LoadingWitnessAnnotations {
        /// Witness whose annotations are requested.
        witness_id: WitnessId,
    },
    /// Annotations of a witness delivered.
    LoadedWitnessAnnotations {
        /// Witness the annotations belong to.
        witness_id: WitnessId,
        /// Complete annotation set of the witness.
        annotations: Vec<AnnotationRecord>,
    },
    /// Operation log of a witness delivered.
    LoadedWitnessAnnotationOperations {
        /// Witness the log belongs to.
        witness_id: WitnessId,
        /// Complete log of the witness.
        operations: Vec<AnnotationOperationRecord>,
    },
    /// A non-default annotation was applied.
    AppliedAnnotation {
        /// Applied annotation.
        unique_id: AnnotationUniqueId,
        /// Witness it was applied on.
        witness_id: WitnessId,
    },
    /// A previously applied annotation was taken back.
    RemovedAppliedAnnotation {
        /// Removed annotation.
        unique_id: AnnotationUniqueId,
        /// Witness it was removed from.
        witness_id: WitnessId,
    },
    /// A default annotation was switched off.
    RemovedDefaultAnnotation {
        /// Removed annotation.
        unique_id: AnnotationUniqueId,
        /// Witness it was removed from.
        witness_id: WitnessId,
    },
    /// A removed default annotation was switched back on.
    AppliedDefaultAnnotation {
        /// Restored annotation.
        unique_id: AnnotationUniqueId,
        /// Witness it was restored on.
        witness_id: WitnessId,
    },
    /// The network layer created and applied an annotation.
    CreatedAnnotation {
        /// Created annotation.
        annotation: Annotation,
    },
    /// The network layer updated an annotation.
    UpdatedAnnotation {
        /// Updated annotation.
        annotation: Annotation,
    },
    /// The network layer deleted an annotation.
    DeletedAnnotation {
        /// Deleted annotation.
        annotation: Annotation,
    },
    /// A save round trip completed and assigned a permanent id.
    SavedAnnotation {
        /// Saved annotation.
        annotation: Annotation,
    },
}

impl Intent {
    /// Stable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadingInitialData => "LOADING_INITIAL_DATA",
            Self::LoadedInitialData => "LOADED_INITIAL_DATA",
            Self::LoadingTexts => "LOADING_TEXTS",
            Self::LoadedTexts { .. } => "LOADED_TEXTS",
            Self::LoadingSources => "LOADING_SOURCES",
            Self::LoadedSources { .. } => "LOADED_SOURCES",
            Self::LoadingWitnesses { .. } => "LOADING_WITNESSES",
            Self::LoadedWitnesses { .. } => "LOADED_WITNESSES",
            Self::LoadingWitnessAnnotations { .. } => "LOADING_WITNESS_ANNOTATIONS",
            Self::LoadedWitnessAnnotations { .. } => "LOADED_WITNESS_ANNOTATIONS",
            Self::LoadedWitnessAnnotationOperations { .. } => "LOADED_WITNESS_ANNOTATION_OPERATIONS",
            Self::AppliedAnnotation { .. } => "text/APPLIED_ANNOTATION",
            Self::RemovedAppliedAnnotation { .. } => "text/REMOVED_APPLIED_ANNOTATION",
            Self::RemovedDefaultAnnotation { .. } => "text/REMOVED_DEFAULT_ANNOTATION",
            Self::AppliedDefaultAnnotation { .. } => "text/APPLIED_DEFAULT_ANNOTATION",
            Self::CreatedAnnotation { .. } => "text/CREATED_ANNOTATION",
            Self::UpdatedAnnotation { .. } => "text/UPDATED_ANNOTATION",
            Self::DeletedAnnotation { .. } => "text/DELETED_ANNOTATION",
            Self::SavedAnnotation { .. } => "text/SAVED_ANNOTATION",
        }
    }

    /// Witness whose annotation set or operation log this intent touches.
    pub fn annotation_witness(&self) -> Option<WitnessId> {
        match self {
            Self::LoadingWitnessAnnotations { witness_id }
            | Self::LoadedWitnessAnnotations { witness_id, .. }
            | Self::LoadedWitnessAnnotationOperations { witness_id, .. }
            | Self::AppliedAnnotation { witness_id, .. }
            | Self::RemovedAppliedAnnotation { witness_id, .. }
            | Self::RemovedDefaultAnnotation { witness_id, .. }
            | Self::AppliedDefaultAnnotation { witness_id, .. } => Some(*witness_id),
            Self::CreatedAnnotation { annotation }
            | Self::UpdatedAnnotation { annotation }
            | Self::DeletedAnnotation { annotation }
            | Self::SavedAnnotation { annotation } => Some(annotation.witness.id),
            _ => None,
        }
    }
}
