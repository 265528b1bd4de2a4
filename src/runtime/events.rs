//! Runtime event stream payloads.

/// Events emitted from the single-writer session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// An intent produced a new snapshot.
    Changed {
        /// Dispatch sequence number.
        seq: u64,
        /// Intent name.
        intent: &'static str,
    },
    /// An intent left the snapshot as it was.
    Unchanged {
        /// Dispatch sequence number.
        seq: u64,
        /// Intent name.
        intent: &'static str,
    },
}
