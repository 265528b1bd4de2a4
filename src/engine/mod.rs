//! Derivation of linked domain objects from raw records.

/// Witness resolution cache.
pub mod cache;
/// Record-to-domain resolver and serializer.
pub mod resolver;
