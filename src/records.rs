//! Flat records as delivered by the network layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{
    AnnotationId, AnnotationOp, AnnotationType, AnnotationUniqueId, SourceId, TextId, UserId,
    WitnessId,
};

/// Raw text row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Text id.
    pub id: TextId,
    /// Display name.
    pub name: String,
}

/// Raw source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Source id.
    pub id: SourceId,
    /// Display name.
    pub name: String,
    /// True for the source all annotations are tracked against.
    pub is_base: bool,
    /// True for the source users edit.
    pub is_working: bool,
}

/// Raw witness row, including the full text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessRecord {
    /// Witness id.
    pub id: WitnessId,
    /// Owning text.
    #[serde(rename = "text")]
    pub text_id: TextId,
    /// Owning source.
    #[serde(rename = "source")]
    pub source_id: SourceId,
    /// Full witness content.
    pub content: String,
    /// True when this is the text's base witness.
    pub is_base: bool,
    /// True when this is the text's working witness.
    pub is_working: bool,
    /// Monotonic content version.
    #[serde(default)]
    pub revision: u64,
    /// Opaque key/value bag.
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Raw annotation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Server id, `None` until saved.
    pub id: Option<AnnotationId>,
    /// Client-stable id.
    pub unique_id: AnnotationUniqueId,
    /// Witness the annotation applies to.
    #[serde(rename = "witness")]
    pub witness_id: WitnessId,
    /// Offset into the witness content.
    pub start: usize,
    /// Length of the replaced span.
    pub length: usize,
    /// Replacement text.
    pub content: String,
    /// Annotation kind.
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    /// Witness that created the annotation.
    #[serde(rename = "creator_witness")]
    pub creator_witness_id: Option<WitnessId>,
    /// User that created the annotation, if any.
    #[serde(rename = "creator_user", default)]
    pub creator_user_id: Option<UserId>,
    /// Unique id of the annotation this one is based on.
    #[serde(default)]
    pub original: Option<AnnotationUniqueId>,
    /// True once the server has acknowledged the annotation.
    #[serde(default)]
    pub is_saved: bool,
    /// Server-side soft-delete marker.
    #[serde(default)]
    pub is_deleted: bool,
}

/// Raw operation-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationOperationRecord {
    /// Witness the choice was made on.
    #[serde(rename = "witness")]
    pub witness_id: WitnessId,
    /// Annotation the choice applies to.
    pub annotation_unique_id: AnnotationUniqueId,
    /// Recorded choice.
    pub operation: AnnotationOp,
}
