//! Normalized client-side state for witness annotation: a snapshot store of
//! texts, sources, witnesses and annotations, per-witness operation logs, and a
//! resolver that rebuilds linked domain objects from the flat records.
//!
//! # Examples
//!
//! Applying intents and resolving the base witness of a text:
//! ```
//! use std::sync::Arc;
//!
//! use witness_store::{
//!     core::{reducer::reduce, store::DataState},
//!     engine::resolver::Resolver,
//!     intent::Intent,
//!     records::{SourceRecord, TextRecord, WitnessRecord},
//! };
//!
//! let text = TextRecord { id: 10, name: "Heart Sutra".to_string() };
//! let mut state = Arc::new(DataState::new());
//! for intent in [
//!     Intent::LoadedTexts { texts: vec![text.clone()] },
//!     Intent::LoadedSources {
//!         sources: vec![SourceRecord { id: 1, name: "Derge".to_string(), is_base: true, is_working: false }],
//!     },
//!     Intent::LoadedWitnesses {
//!         text,
//!         witnesses: vec![WitnessRecord {
//!             id: 5,
//!             text_id: 10,
//!             source_id: 1,
//!             content: "gate gate".to_string(),
//!             is_base: true,
//!             is_working: false,
//!             revision: 1,
//!             properties: None,
//!         }],
//!     },
//! ] {
//!     state = reduce(&state, &intent);
//! }
//!
//! let mut resolver = Resolver::default();
//! let base = resolver.base_witness(&state, 10).expect("base witness");
//! assert_eq!(base.id, 5);
//! assert_eq!(base.text.name, "Heart Sutra");
//! ```
//!
//! Running the same flow behind the single-writer runtime:
//! ```no_run
//! use std::sync::Arc;
//!
//! use witness_store::{
//!     core::store::DataState,
//!     intent::Intent,
//!     runtime::handle::{spawn_session, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_session(Arc::new(DataState::new()), RuntimeConfig::default());
//! handle.dispatch(Intent::LoadingTexts).await.expect("dispatch");
//! let snapshot = handle.snapshot().await.expect("snapshot");
//! assert!(snapshot.flags().loading_texts);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Record store, operation log and reducer.
pub mod core;
/// Linked domain objects.
pub mod domain;
/// Resolver and witness cache.
pub mod engine;
/// Intents applied by the reducer.
pub mod intent;
/// Flat records exchanged with the network layer.
pub mod records;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
