//! Normalized record store, operation log and reducer.

/// Copy-on-write keyed collections.
pub mod collection;
/// Per-witness applied/removed annotation buckets.
pub mod oplog;
/// Exhaustive intent dispatch.
pub mod reducer;
/// Snapshot of all loaded records.
pub mod store;
