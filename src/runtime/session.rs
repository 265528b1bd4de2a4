//! Snapshot owner driven by the command loop.

use std::sync::Arc;

use tracing::trace;

use crate::{
    core::{reducer::reduce, store::DataState},
    engine::resolver::{Resolver, ResolverConfig},
    intent::Intent,
};

/// Outcome of one [`Session::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// 1-based position of the intent in arrival order.
    pub seq: u64,
    /// False when the reducer handed back the previous snapshot.
    pub changed: bool,
}

/// Current snapshot plus the resolver that reads it.
///
/// Intents are applied strictly one at a time; the resolver sees every intent
/// right after the reducer so its cache never outlives a reload.
#[derive(Debug, Default)]
pub struct Session {
    state: Arc<DataState>,
    resolver: Resolver,
    dispatched: u64,
}

impl Session {
    /// Empty session.
    pub fn new(config: ResolverConfig) -> Self {
        Self::from_state(Arc::new(DataState::new()), config)
    }

    /// Session seeded with an existing snapshot, e.g. one rebuilt from a server bootstrap.
    pub fn from_state(state: Arc<DataState>, config: ResolverConfig) -> Self {
        Self {
            state,
            resolver: Resolver::new(config),
            dispatched: 0,
        }
    }

    /// Applies one intent and lets the resolver react to it.
    pub fn dispatch(&mut self, intent: &Intent) -> Dispatched {
        let next = reduce(&self.state, intent);
        let changed = !Arc::ptr_eq(&next, &self.state);
        self.state = next;
        self.resolver.observe(intent);
        self.dispatched += 1;

        trace!(
            seq = self.dispatched,
            intent = intent.name(),
            witness_id = intent.annotation_witness(),
            changed,
            "intent applied"
        );
        Dispatched {
            seq: self.dispatched,
            changed,
        }
    }

    /// Latest snapshot. Cheap to clone and never modified afterwards.
    pub fn state(&self) -> &Arc<DataState> {
        &self.state
    }

    /// Latest snapshot together with the resolver, for selector calls.
    pub fn view(&mut self) -> (&DataState, &mut Resolver) {
        (&self.state, &mut self.resolver)
    }

    /// Number of intents applied so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
