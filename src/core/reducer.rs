//! Single entry point turning an intent into the next snapshot.

use std::sync::Arc;

use tracing::warn;

use crate::{domain::Annotation, engine::resolver::serialize_annotation, intent::Intent};

use super::store::DataState;

/// Applies `intent` to `state` and returns the next snapshot.
///
/// `state` is never modified. When the intent leaves everything as it was the
/// very same `Arc` is returned, so callers can detect changes with
/// [`Arc::ptr_eq`].
pub fn reduce(state: &Arc<DataState>, intent: &Intent) -> Arc<DataState> {
    let next = match intent {
        Intent::LoadingInitialData => Some(state.with_flags(|f| {
            f.loading_initial_data = true;
            f.loaded_initial_data = false;
        })),
        Intent::LoadedInitialData => Some(state.with_flags(|f| {
            f.loading_initial_data = false;
            f.loaded_initial_data = true;
        })),
        Intent::LoadingTexts => Some(state.with_flags(|f| {
            f.loading_texts = true;
            f.loaded_texts = false;
        })),
        Intent::LoadedTexts { texts } => Some(state.with_texts(texts.clone()).with_flags(|f| {
            f.loading_texts = false;
            f.loaded_texts = true;
        })),
        Intent::LoadingSources => Some(state.with_flags(|f| {
            f.loading_sources = true;
            f.loaded_sources = false;
        })),
        Intent::LoadedSources { sources } => {
            Some(state.with_sources(sources.clone()).with_flags(|f| {
                f.loading_sources = false;
                f.loaded_sources = true;
            }))
        }
        Intent::LoadingWitnesses { .. } => Some(state.with_flags(|f| {
            f.loading_witnesses = true;
            f.loaded_witnesses = false;
        })),
        Intent::LoadedWitnesses { text, witnesses } => Some(
            state
                .with_text_witnesses(text.id, witnesses.clone())
                .with_flags(|f| {
                    f.loading_witnesses = false;
                    f.loaded_witnesses = true;
                }),
        ),
        Intent::LoadingWitnessAnnotations { .. } => Some(state.with_flags(|f| {
            f.loading_annotations = true;
            f.loaded_annotations = false;
        })),
        Intent::LoadedWitnessAnnotations {
            witness_id,
            annotations,
        } => {
            let saved = annotations
                .iter()
                .cloned()
                .map(|mut a| {
                    a.is_saved = true;
                    a
                })
                .collect();
            Some(
                state
                    .with_witness_annotations(*witness_id, saved)
                    .with_flags(|f| {
                        f.loading_annotations = !f.loaded_annotation_operations;
                        f.loaded_annotations = true;
                    }),
            )
        }
        Intent::LoadedWitnessAnnotationOperations {
            witness_id,
            operations,
        } => Some(
            state
                .with_loaded_operations(*witness_id, operations)
                .with_flags(|f| {
                    f.loading_annotations = !f.loaded_annotations;
                    f.loaded_annotation_operations = true;
                }),
        ),
        Intent::AppliedAnnotation {
            unique_id,
            witness_id,
        } => state.record_applied(*witness_id, unique_id),
        Intent::RemovedAppliedAnnotation {
            unique_id,
            witness_id,
        } => state.record_removed_applied(*witness_id, unique_id),
        Intent::RemovedDefaultAnnotation {
            unique_id,
            witness_id,
        } => state.record_removed_default(*witness_id, unique_id),
        Intent::AppliedDefaultAnnotation {
            unique_id,
            witness_id,
        } => state.record_applied_default(*witness_id, unique_id),
        Intent::CreatedAnnotation { annotation } => created_annotation(state, annotation),
        Intent::UpdatedAnnotation { annotation } => {
            if !annotation.is_saved() {
                warn!(
                    intent = intent.name(),
                    unique_id = %annotation.unique_id,
                    "updating annotation which is not saved"
                );
            }
            created_annotation(state, annotation)
        }
        Intent::DeletedAnnotation { annotation } => {
            if !annotation.is_saved() {
                warn!(
                    intent = intent.name(),
                    unique_id = %annotation.unique_id,
                    "deleting annotation which is not saved"
                );
            }
            Some(state.without_annotation(annotation.witness.id, &annotation.unique_id))
        }
        Intent::SavedAnnotation { annotation } => store_serialized(state, annotation),
    };

    next.map(Arc::new).unwrap_or_else(|| Arc::clone(state))
}

fn created_annotation(state: &DataState, annotation: &Annotation) -> Option<DataState> {
    let mut annotation = annotation.clone();
    annotation.save();
    store_serialized(state, &annotation)
}

fn store_serialized(state: &DataState, annotation: &Annotation) -> Option<DataState> {
    serialize_annotation(annotation).map(|record| state.with_annotation(record))
}
