//! Async handle to the single-writer session loop.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use crate::{
    core::store::DataState,
    domain::{Annotation, Source, Text, Witness},
    engine::resolver::ResolverConfig,
    intent::Intent,
    types::{AnnotationUniqueId, TextId, WitnessId},
};

use super::{
    events::StoreEvent,
    session::{Dispatched, Session},
};

/// Failure talking to the session loop.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The loop has shut down or panicked.
    #[error("session loop is no longer running")]
    ChannelClosed,
}

/// Channel sizing and resolver settings for [`spawn_session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Pending commands before callers wait.
    pub command_queue_bound: usize,
    /// Events buffered per subscriber before it lags.
    pub event_queue_bound: usize,
    /// Settings for the session's resolver.
    pub resolver: ResolverConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_queue_bound: 1024,
            resolver: ResolverConfig::default(),
        }
    }
}

/// Cloneable front end to a running session loop.
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl Clone for SessionHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Dispatch {
        intent: Intent,
        resp: oneshot::Sender<Dispatched>,
    },
    Snapshot {
        resp: oneshot::Sender<Arc<DataState>>,
    },
    Text {
        text_id: TextId,
        resp: oneshot::Sender<Option<Text>>,
    },
    Sources {
        resp: oneshot::Sender<Vec<Source>>,
    },
    Witness {
        witness_id: WitnessId,
        resp: oneshot::Sender<Option<Arc<Witness>>>,
    },
    TextWitnesses {
        text_id: TextId,
        resp: oneshot::Sender<Vec<Arc<Witness>>>,
    },
    BaseWitness {
        text_id: TextId,
        resp: oneshot::Sender<Option<Arc<Witness>>>,
    },
    WorkingWitness {
        text_id: TextId,
        resp: oneshot::Sender<Option<Arc<Witness>>>,
    },
    WitnessAnnotations {
        witness_id: WitnessId,
        resp: oneshot::Sender<Vec<Annotation>>,
    },
    Annotation {
        witness_id: WitnessId,
        unique_id: AnnotationUniqueId,
        resp: oneshot::Sender<Option<Annotation>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Starts the session loop on the current tokio runtime.
pub fn spawn_session(state: Arc<DataState>, config: RuntimeConfig) -> SessionHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<StoreEvent>(config.event_queue_bound);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut session = Session::from_state(state, config.resolver);

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut session, &events_tx_loop) {
                break;
            }
        }

        debug!(dispatched = session.dispatched(), "session loop stopped");
    });

    SessionHandle { cmd_tx, events_tx }
}

impl SessionHandle {
    /// New receiver for [`StoreEvent`]s emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    /// Applies an intent; resolves once the loop has reduced it.
    pub async fn dispatch(&self, intent: Intent) -> Result<Dispatched, RuntimeError> {
        self.request(|resp| Command::Dispatch { intent, resp }).await
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Result<Arc<DataState>, RuntimeError> {
        self.request(|resp| Command::Snapshot { resp }).await
    }

    /// Resolved text, if loaded.
    pub async fn text(&self, text_id: TextId) -> Result<Option<Text>, RuntimeError> {
        self.request(|resp| Command::Text { text_id, resp }).await
    }

    /// All loaded sources in load order.
    pub async fn sources(&self) -> Result<Vec<Source>, RuntimeError> {
        self.request(|resp| Command::Sources { resp }).await
    }

    /// Resolved witness; `None` when it or its text/source is missing.
    pub async fn witness(&self, witness_id: WitnessId) -> Result<Option<Arc<Witness>>, RuntimeError> {
        self.request(|resp| Command::Witness { witness_id, resp }).await
    }

    /// Resolvable witnesses of a text.
    pub async fn text_witnesses(&self, text_id: TextId) -> Result<Vec<Arc<Witness>>, RuntimeError> {
        self.request(|resp| Command::TextWitnesses { text_id, resp })
            .await
    }

    /// Base witness of a text.
    pub async fn base_witness(&self, text_id: TextId) -> Result<Option<Arc<Witness>>, RuntimeError> {
        self.request(|resp| Command::BaseWitness { text_id, resp })
            .await
    }

    /// Working witness of a text.
    pub async fn working_witness(&self, text_id: TextId) -> Result<Option<Arc<Witness>>, RuntimeError> {
        self.request(|resp| Command::WorkingWitness { text_id, resp })
            .await
    }

    /// Resolvable annotations stored against a witness.
    pub async fn witness_annotations(&self, witness_id: WitnessId) -> Result<Vec<Annotation>, RuntimeError> {
        self.request(|resp| Command::WitnessAnnotations { witness_id, resp })
            .await
    }

    /// One annotation by its unique id.
    pub async fn annotation(
        &self,
        witness_id: WitnessId,
        unique_id: AnnotationUniqueId,
    ) -> Result<Option<Annotation>, RuntimeError> {
        self.request(|resp| Command::Annotation {
            witness_id,
            unique_id,
            resp,
        })
        .await
    }

    /// Stops the loop after pending commands have been handled.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(cmd: Command, session: &mut Session, events_tx: &broadcast::Sender<StoreEvent>) -> bool {
    match cmd {
        Command::Dispatch { intent, resp } => {
            let dispatched = session.dispatch(&intent);
            let event = if dispatched.changed {
                StoreEvent::Changed {
                    seq: dispatched.seq,
                    intent: intent.name(),
                }
            } else {
                StoreEvent::Unchanged {
                    seq: dispatched.seq,
                    intent: intent.name(),
                }
            };
            let _ = events_tx.send(event);
            let _ = resp.send(dispatched);
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(Arc::clone(session.state()));
        }
        Command::Text { text_id, resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.text(state, text_id));
        }
        Command::Sources { resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.sources(state));
        }
        Command::Witness { witness_id, resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.witness(state, witness_id));
        }
        Command::TextWitnesses { text_id, resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.text_witnesses(state, text_id));
        }
        Command::BaseWitness { text_id, resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.base_witness(state, text_id));
        }
        Command::WorkingWitness { text_id, resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.working_witness(state, text_id));
        }
        Command::WitnessAnnotations { witness_id, resp } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.witness_annotations(state, witness_id));
        }
        Command::Annotation {
            witness_id,
            unique_id,
            resp,
        } => {
            let (state, resolver) = session.view();
            let _ = resp.send(resolver.annotation_by_unique_id(state, witness_id, &unique_id));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}
