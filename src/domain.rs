//! Fully linked domain objects built by [`crate::engine::resolver::Resolver`].

use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    records::AnnotationRecord,
    types::{
        AnnotationId, AnnotationType, AnnotationUniqueId, SourceId, TextId, UserId, WitnessId,
    },
};

/// A text in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Text id.
    pub id: TextId,
    /// Display name.
    pub name: String,
}

/// A source witnesses are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Source id.
    pub id: SourceId,
    /// Display name.
    pub name: String,
    /// True for the base source.
    pub is_base: bool,
    /// True for the working source.
    pub is_working: bool,
}

/// One variant of a text's content.
#[derive(Debug, Clone, PartialEq)]
pub struct Witness {
    /// Witness id.
    pub id: WitnessId,
    /// Owning text.
    pub text: Arc<Text>,
    /// Owning source.
    pub source: Arc<Source>,
    /// Full witness content.
    pub content: String,
    /// True when this is the text's base witness.
    pub is_base: bool,
    /// True when this is the text's working witness.
    pub is_working: bool,
    /// Monotonic content version.
    pub revision: u64,
    /// Opaque key/value bag.
    pub properties: Option<Map<String, Value>>,
}

/// An annotation author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User id.
    pub id: UserId,
    /// Display name, empty when only the id is known.
    pub name: String,
}

/// A textual change against a witness, with its lineage resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Server id, `None` until saved.
    pub id: Option<AnnotationId>,
    /// Client-stable id.
    pub unique_id: AnnotationUniqueId,
    /// Witness the annotation applies to.
    pub witness: Arc<Witness>,
    /// Offset into the witness content.
    pub start: usize,
    /// Length of the replaced span.
    pub length: usize,
    /// Replacement text.
    pub content: String,
    /// Annotation kind.
    pub annotation_type: AnnotationType,
    /// Creating witness. Always set on resolved annotations.
    pub creator_witness: Option<Arc<Witness>>,
    /// Creating user, if any.
    pub creator_user: Option<User>,
    /// Annotation this one supersedes.
    pub based_on: Option<Arc<Annotation>>,
    is_saved: bool,
}

impl Annotation {
    /// Builds an unsaved annotation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Option<AnnotationId>,
        unique_id: AnnotationUniqueId,
        witness: Arc<Witness>,
        start: usize,
        length: usize,
        content: String,
        annotation_type: AnnotationType,
        creator_witness: Option<Arc<Witness>>,
        creator_user: Option<User>,
        based_on: Option<Arc<Annotation>>,
    ) -> Self {
        Self {
            id,
            unique_id,
            witness,
            start,
            length,
            content,
            annotation_type,
            creator_witness,
            creator_user,
            based_on,
            is_saved: false,
        }
    }

    /// Marks the annotation as acknowledged by the server.
    pub fn save(&mut self) {
        self.is_saved = true;
    }

    /// Returns true once [`Annotation::save`] has been called.
    pub fn is_saved(&self) -> bool {
        self.is_saved
    }

    /// Number of `based_on` links below this annotation.
    pub fn lineage_len(&self) -> usize {
        let mut len = 0;
        let mut cur = self.based_on.as_deref();
        while let Some(parent) = cur {
            len += 1;
            cur = parent.based_on.as_deref();
        }
        len
    }

    /// Converts back into the flat wire record.
    ///
    /// Returns `None` without a creator witness since the server requires one.
    pub fn to_record(&self) -> Option<AnnotationRecord> {
        let creator_witness = self.creator_witness.as_ref()?;
        Some(AnnotationRecord {
            id: self.id,
            unique_id: self.unique_id.clone(),
            witness_id: self.witness.id,
            start: self.start,
            length: self.length,
            content: self.content.clone(),
            annotation_type: self.annotation_type,
            creator_witness_id: Some(creator_witness.id),
            creator_user_id: self.creator_user.as_ref().map(|u| u.id),
            original: self.based_on.as_ref().map(|a| a.unique_id.clone()),
            is_saved: self.is_saved,
            is_deleted: false,
        })
    }
}

/// Client-only annotation used while an edit is in progress.
///
/// Carries a provisional unique id and is never marked saved.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporaryAnnotation {
    annotation: Annotation,
}

impl TemporaryAnnotation {
    /// Starts an edit against `witness`, optionally based on an existing annotation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        based_on: Option<Arc<Annotation>>,
        witness: Arc<Witness>,
        start: usize,
        length: usize,
        content: String,
        annotation_type: AnnotationType,
        creator_witness: Option<Arc<Witness>>,
        creator_user: Option<User>,
    ) -> Self {
        Self {
            annotation: Annotation::new(
                None,
                Uuid::new_v4().to_string(),
                witness,
                start,
                length,
                content,
                annotation_type,
                creator_witness,
                creator_user,
                based_on,
            ),
        }
    }

    /// Borrows the in-progress annotation.
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Mutable access for editing span and content.
    pub fn annotation_mut(&mut self) -> &mut Annotation {
        &mut self.annotation
    }

    /// Hands the annotation over to the save path.
    pub fn into_annotation(self) -> Annotation {
        self.annotation
    }
}
