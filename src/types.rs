//! Shared primitive IDs and annotation enums.

use serde::{Deserialize, Serialize};

/// Server-assigned text identifier.
pub type TextId = u64;
/// Server-assigned source identifier.
pub type SourceId = u64;
/// Server-assigned witness identifier.
pub type WitnessId = u64;
/// Server-assigned annotation identifier, absent until saved.
pub type AnnotationId = u64;
/// Server-assigned user identifier.
pub type UserId = u64;
/// Client-stable annotation identifier, present before the first save.
pub type AnnotationUniqueId = String;

/// Default bound on `original` chain walks.
pub const DEFAULT_MAX_LINEAGE_DEPTH: usize = 256;

/// Kind of textual change an annotation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationType {
    /// Variant reading.
    #[serde(rename = "V")]
    Variant,
    /// Free-form note.
    #[serde(rename = "N")]
    Note,
    /// Page break marker.
    #[serde(rename = "P")]
    PageBreak,
    /// Line break marker.
    #[serde(rename = "L")]
    LineBreak,
}

/// Explicit user choice recorded in a witness's operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationOp {
    /// Annotation applied on top of the defaults.
    #[serde(rename = "A")]
    Applied,
    /// Default annotation removed.
    #[serde(rename = "R")]
    Removed,
}
