//! Resolution of flat records into linked domain objects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    core::store::DataState,
    domain::{Annotation, Source, Text, User, Witness},
    intent::Intent,
    records::AnnotationRecord,
    types::{AnnotationUniqueId, DEFAULT_MAX_LINEAGE_DEPTH, SourceId, TextId, WitnessId},
};

use super::cache::WitnessCache;

/// Reasons a domain object cannot currently be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No record for the witness.
    #[error("witness {0} is not loaded")]
    WitnessNotFound(WitnessId),

    /// The witness points at an unloaded text.
    #[error("witness {witness_id} references text {text_id} which is not loaded")]
    TextNotFound {
        /// Witness being resolved.
        witness_id: WitnessId,
        /// Missing text.
        text_id: TextId,
    },

    /// The witness points at an unloaded source.
    #[error("witness {witness_id} references source {source_id} which is not loaded")]
    SourceNotFound {
        /// Witness being resolved.
        witness_id: WitnessId,
        /// Missing source.
        source_id: SourceId,
    },

    /// Annotations always need a creator witness.
    #[error("annotation {unique_id} has no creator witness")]
    MissingCreatorWitness {
        /// Annotation being resolved.
        unique_id: AnnotationUniqueId,
    },

    /// The creator witness id does not resolve.
    #[error("annotation {unique_id} has creator witness {witness_id} which cannot be resolved")]
    CreatorWitnessUnresolved {
        /// Annotation being resolved.
        unique_id: AnnotationUniqueId,
        /// Creator witness that failed.
        witness_id: WitnessId,
    },

    /// No record with that unique id on the witness.
    #[error("annotation {unique_id} is not loaded for witness {witness_id}")]
    AnnotationNotFound {
        /// Witness searched.
        witness_id: WitnessId,
        /// Requested unique id.
        unique_id: AnnotationUniqueId,
    },

    /// `original` links loop or exceed the configured depth.
    #[error("lineage of annotation {unique_id} is deeper than {max_depth}")]
    LineageTooDeep {
        /// Annotation whose lineage was being followed.
        unique_id: AnnotationUniqueId,
        /// Depth limit in effect.
        max_depth: usize,
    },
}

/// Resolver tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of `based_on` links followed before giving up.
    ///
    /// Values above [`DEFAULT_MAX_LINEAGE_DEPTH`] are clamped to it since
    /// lineage resolution recurses once per link.
    pub max_lineage_depth: usize,
    /// Rebuild a cached witness when the stored record carries another revision.
    pub check_witness_revision: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_lineage_depth: DEFAULT_MAX_LINEAGE_DEPTH,
            check_witness_revision: true,
        }
    }
}

/// Builds linked domain objects from a [`DataState`] snapshot.
///
/// Owns the witness cache; call [`Resolver::observe`] with every dispatched
/// intent (or [`Resolver::invalidate_witness`] directly) so cached witnesses
/// follow content reloads.
#[derive(Debug, Default)]
pub struct Resolver {
    config: ResolverConfig,
    witnesses: WitnessCache,
}

impl Resolver {
    /// Resolver with an empty cache.
    pub fn new(mut config: ResolverConfig) -> Self {
        if config.max_lineage_depth > DEFAULT_MAX_LINEAGE_DEPTH {
            warn!(
                requested = config.max_lineage_depth,
                max_depth = DEFAULT_MAX_LINEAGE_DEPTH,
                "lineage depth clamped"
            );
            config.max_lineage_depth = DEFAULT_MAX_LINEAGE_DEPTH;
        }
        Self {
            config,
            witnesses: WitnessCache::new(),
        }
    }

    /// Effective configuration, after clamping.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Witness cache, for inspection.
    pub fn cache(&self) -> &WitnessCache {
        &self.witnesses
    }

    /// Text by id.
    pub fn text(&self, state: &DataState, text_id: TextId) -> Option<Text> {
        state.text_record(text_id).map(|r| Text {
            id: r.id,
            name: r.name.clone(),
        })
    }

    /// Source by id.
    pub fn source(&self, state: &DataState, source_id: SourceId) -> Option<Source> {
        state.source_record(source_id).map(|r| Source {
            id: r.id,
            name: r.name.clone(),
            is_base: r.is_base,
            is_working: r.is_working,
        })
    }

    /// Every loaded source, in load order.
    pub fn sources(&self, state: &DataState) -> Vec<Source> {
        state
            .sources()
            .iter()
            .filter_map(|r| self.source(state, r.id))
            .collect()
    }

    /// Resolves a witness with its text and source, serving from the cache when possible.
    pub fn try_witness(&mut self, state: &DataState, witness_id: WitnessId) -> Result<Arc<Witness>, ResolveError> {
        let mut stale = false;
        if let Some(cached) = self.witnesses.get(witness_id) {
            let current = state.witness_data(witness_id).map(|r| r.revision);
            if !self.config.check_witness_revision || current.is_none_or(|rev| rev == cached.revision) {
                return Ok(Arc::clone(cached));
            }
            stale = true;
        }
        if stale {
            debug!(witness_id, "cached witness revision is stale, rebuilding");
            self.witnesses.invalidate(witness_id);
        }

        let record = state
            .witness_data(witness_id)
            .ok_or(ResolveError::WitnessNotFound(witness_id))?;
        let source = self
            .source(state, record.source_id)
            .ok_or(ResolveError::SourceNotFound {
                witness_id,
                source_id: record.source_id,
            })?;
        let text = self
            .text(state, record.text_id)
            .ok_or(ResolveError::TextNotFound {
                witness_id,
                text_id: record.text_id,
            })?;

        let witness = Arc::new(Witness {
            id: record.id,
            text: Arc::new(text),
            source: Arc::new(source),
            content: record.content.clone(),
            is_base: record.is_base,
            is_working: record.is_working,
            revision: record.revision,
            properties: record.properties.clone(),
        });
        self.witnesses.insert(Arc::clone(&witness));
        Ok(witness)
    }

    /// Like [`Resolver::try_witness`], logging the failure instead of returning it.
    pub fn witness(&mut self, state: &DataState, witness_id: WitnessId) -> Option<Arc<Witness>> {
        self.try_witness(state, witness_id)
            .inspect_err(|err| warn!(witness_id, error = %err, "witness cannot be resolved"))
            .ok()
    }

    /// Resolvable witnesses of `text_id`, in ascending id order.
    pub fn text_witnesses(&mut self, state: &DataState, text_id: TextId) -> Vec<Arc<Witness>> {
        let ids: Vec<WitnessId> = state
            .text_witness_records(text_id)
            .map(|records| records.keys().copied().collect())
            .unwrap_or_default();
        ids.into_iter()
            .filter_map(|id| self.witness(state, id))
            .collect()
    }

    /// The text's base witness.
    ///
    /// With several flagged witnesses the highest id wins; with none flagged
    /// the lowest id is used.
    pub fn base_witness(&mut self, state: &DataState, text_id: TextId) -> Option<Arc<Witness>> {
        let records = state.text_witness_records(text_id)?;
        let chosen = records
            .iter()
            .rev()
            .find(|w| w.is_base)
            .or_else(|| records.iter().next())?
            .id;
        self.witness(state, chosen)
    }

    /// The text's working witness; the highest flagged id wins.
    pub fn working_witness(&mut self, state: &DataState, text_id: TextId) -> Option<Arc<Witness>> {
        let chosen = state
            .text_witness_records(text_id)?
            .iter()
            .rev()
            .find(|w| w.is_working)?
            .id;
        self.witness(state, chosen)
    }

    /// Builds an annotation from its record, resolving its lineage through
    /// sibling records of the same witness.
    pub fn try_annotation(&mut self, state: &DataState, record: &AnnotationRecord) -> Result<Annotation, ResolveError> {
        self.annotation_at_depth(state, record, 0)
    }

    /// Like [`Resolver::try_annotation`], logging the failure instead of returning it.
    pub fn annotation(&mut self, state: &DataState, record: &AnnotationRecord) -> Option<Annotation> {
        self.try_annotation(state, record)
            .inspect_err(|err| {
                warn!(
                    unique_id = %record.unique_id,
                    witness_id = record.witness_id,
                    error = %err,
                    "annotation cannot be resolved"
                )
            })
            .ok()
    }

    /// Looks up and resolves one annotation of `witness_id`, naming the missing record.
    pub fn try_annotation_by_unique_id(
        &mut self,
        state: &DataState,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Result<Annotation, ResolveError> {
        let record = state
            .annotation_data(witness_id, unique_id)
            .ok_or_else(|| ResolveError::AnnotationNotFound {
                witness_id,
                unique_id: unique_id.clone(),
            })?;
        self.try_annotation(state, record)
    }

    /// Looks up and resolves one annotation of `witness_id`.
    pub fn annotation_by_unique_id(
        &mut self,
        state: &DataState,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<Annotation> {
        let record = state.annotation_data(witness_id, unique_id)?;
        self.annotation(state, record)
    }

    /// Every resolvable annotation of `witness_id`, in load order.
    pub fn witness_annotations(&mut self, state: &DataState, witness_id: WitnessId) -> Vec<Annotation> {
        let Some(records) = state.witness_annotations(witness_id) else {
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|record| self.annotation(state, record))
            .collect()
    }

    /// Drops the cached entry for `witness_id`.
    pub fn invalidate_witness(&mut self, witness_id: WitnessId) {
        if self.witnesses.invalidate(witness_id) {
            debug!(witness_id, "witness cache entry invalidated");
        }
    }

    /// Drops every cached witness.
    pub fn clear(&mut self) {
        self.witnesses.clear();
    }

    /// Root record of the annotation's lineage, capped at the configured depth.
    pub fn original_annotation_data<'s>(
        &self,
        state: &'s DataState,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> Option<&'s AnnotationRecord> {
        state.original_annotation_data_within(witness_id, unique_id, self.config.max_lineage_depth)
    }

    /// True when the lineage root was created by a user, capped at the configured depth.
    pub fn is_originally_user_created(
        &self,
        state: &DataState,
        witness_id: WitnessId,
        unique_id: &AnnotationUniqueId,
    ) -> bool {
        state.is_originally_user_created_within(witness_id, unique_id, self.config.max_lineage_depth)
    }

    /// Drops cache entries an intent may have made stale.
    pub fn observe(&mut self, intent: &Intent) {
        match intent {
            Intent::LoadedTexts { .. } | Intent::LoadedSources { .. } => self.clear(),
            Intent::LoadedWitnesses { witnesses, .. } => {
                for witness in witnesses {
                    self.invalidate_witness(witness.id);
                }
            }
            _ => {}
        }
    }

    fn annotation_at_depth(
        &mut self,
        state: &DataState,
        record: &AnnotationRecord,
        depth: usize,
    ) -> Result<Annotation, ResolveError> {
        if depth > self.config.max_lineage_depth {
            return Err(ResolveError::LineageTooDeep {
                unique_id: record.unique_id.clone(),
                max_depth: self.config.max_lineage_depth,
            });
        }

        let witness = self.try_witness(state, record.witness_id)?;
        let creator_witness_id =
            record
                .creator_witness_id
                .ok_or_else(|| ResolveError::MissingCreatorWitness {
                    unique_id: record.unique_id.clone(),
                })?;
        let creator_witness = self.try_witness(state, creator_witness_id).map_err(|_| {
            ResolveError::CreatorWitnessUnresolved {
                unique_id: record.unique_id.clone(),
                witness_id: creator_witness_id,
            }
        })?;
        let creator_user = record.creator_user_id.map(|id| User {
            id,
            name: String::new(),
        });

        let based_on = match record
            .original
            .as_ref()
            .and_then(|original| state.annotation_data(record.witness_id, original))
        {
            Some(parent) => match self.annotation_at_depth(state, parent, depth + 1) {
                Ok(parent) => Some(Arc::new(parent)),
                Err(err @ ResolveError::LineageTooDeep { .. }) => return Err(err),
                Err(err) => {
                    debug!(
                        unique_id = %record.unique_id,
                        error = %err,
                        "based-on annotation cannot be resolved"
                    );
                    None
                }
            },
            None => None,
        };

        let mut annotation = Annotation::new(
            record.id,
            record.unique_id.clone(),
            witness,
            record.start,
            record.length,
            record.content.clone(),
            record.annotation_type,
            Some(creator_witness),
            creator_user,
            based_on,
        );
        if record.is_saved {
            annotation.save();
        }
        Ok(annotation)
    }
}

/// Flat record for a server round trip. `None` without a creator witness.
pub fn serialize_annotation(annotation: &Annotation) -> Option<AnnotationRecord> {
    let record = annotation.to_record();
    if record.is_none() {
        warn!(
            unique_id = %annotation.unique_id,
            witness_id = annotation.witness.id,
            "annotation has no creator witness"
        );
    }
    record
}
