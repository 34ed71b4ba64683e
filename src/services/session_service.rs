use std::{collections::VecDeque, sync::Arc};

use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, trace, warn};

use crate::{
    config::SessionConfig,
    dto::inbound::InboundEvent,
    error::ServiceError,
    state::{
        Effect, FoldError, SessionEvent, SessionSnapshot, Transition, fold,
        timers::PauseSource,
    },
};

type FoldReply = oneshot::Sender<Result<Arc<SessionSnapshot>, FoldError>>;

enum Command {
    Apply {
        event: SessionEvent,
        reply: Option<FoldReply>,
    },
    History {
        reply: oneshot::Sender<Vec<Arc<SessionSnapshot>>>,
    },
}

/// Cloneable handle to a running session driver.
///
/// Server notifications and local intents go through the same queue, so they
/// are folded strictly one after another.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<SessionSnapshot>>,
    effects: broadcast::Sender<Effect>,
}

/// Start a driver task owning `initial`.
pub fn spawn_session(
    initial: SessionSnapshot,
    config: &SessionConfig,
) -> (SessionHandle, JoinHandle<()>) {
    let initial = Arc::new(initial);
    let (commands_tx, commands_rx) = mpsc::channel(config.event_queue_capacity);
    let (snapshots_tx, snapshots_rx) = watch::channel(Arc::clone(&initial));
    let (effects_tx, _effects_rx) = broadcast::channel(config.effect_channel_capacity);

    info!(session_id = %initial.session_id, role = ?initial.role, "session joined");

    let task = tokio::spawn(run_session(
        initial,
        commands_rx,
        snapshots_tx,
        effects_tx.clone(),
        config.history_limit,
    ));

    let handle = SessionHandle {
        commands: commands_tx,
        snapshots: snapshots_rx,
        effects: effects_tx,
    };
    (handle, task)
}

impl SessionHandle {
    /// Latest snapshot.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.snapshots.clone()
    }

    /// Stream of snapshots, starting with the current one.
    pub fn snapshot_stream(&self) -> WatchStream<Arc<SessionSnapshot>> {
        WatchStream::new(self.snapshots.clone())
    }

    /// Register for effects raised by subsequent folds.
    pub fn effects(&self) -> broadcast::Receiver<Effect> {
        self.effects.subscribe()
    }

    /// Queue an event without waiting for its outcome.
    pub async fn post(&self, event: SessionEvent) -> Result<(), ServiceError> {
        self.commands
            .send(Command::Apply { event, reply: None })
            .await
            .map_err(|_| ServiceError::Closed)
    }

    /// Decode a JSON message and queue it.
    pub async fn post_json(&self, text: &str) -> Result<(), ServiceError> {
        let event = InboundEvent::decode(text)?;
        self.post(event).await
    }

    /// Queue an event and wait for the snapshot it produced.
    pub async fn submit(&self, event: SessionEvent) -> Result<Arc<SessionSnapshot>, ServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Apply {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| ServiceError::Closed)?;

        let outcome = reply_rx.await.map_err(|_| ServiceError::Closed)?;
        Ok(outcome?)
    }

    /// Local user proposes a stake. A refused value is reported through the
    /// stake panel message as well as the returned error.
    pub async fn propose_stake(&self, value: i32) -> Result<Arc<SessionSnapshot>, ServiceError> {
        match self.submit(SessionEvent::StakeProposed { value }).await {
            Err(ServiceError::Rejected(err @ FoldError::Malformed { .. })) => {
                self.post(SessionEvent::StakeMessage {
                    message: format!("invalid stake: {value}"),
                })
                .await?;
                Err(ServiceError::Rejected(err))
            }
            other => other,
        }
    }

    /// Local user presses the pause button.
    pub async fn request_pause(&self) -> Result<Arc<SessionSnapshot>, ServiceError> {
        self.submit(SessionEvent::PauseToggle {
            source: PauseSource::User,
        })
        .await
    }

    /// Local user edits the pending answer.
    pub async fn set_answer(
        &self,
        answer: Option<String>,
    ) -> Result<Arc<SessionSnapshot>, ServiceError> {
        self.submit(SessionEvent::AnswerChanged { answer }).await
    }

    /// Snapshots that preceded the current one, oldest first.
    pub async fn history(&self) -> Result<Vec<Arc<SessionSnapshot>>, ServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::History { reply: reply_tx })
            .await
            .map_err(|_| ServiceError::Closed)?;
        reply_rx.await.map_err(|_| ServiceError::Closed)
    }
}

/// Fold queued events one at a time until every handle is dropped.
async fn run_session(
    mut current: Arc<SessionSnapshot>,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Arc<SessionSnapshot>>,
    effects: broadcast::Sender<Effect>,
    history_limit: usize,
) {
    let mut history: VecDeque<Arc<SessionSnapshot>> = VecDeque::with_capacity(history_limit);

    while let Some(command) = commands.recv().await {
        match command {
            Command::Apply { event, reply } => {
                let kind = event.kind();
                let outcome = match fold(&current, event) {
                    Ok(Transition {
                        snapshot,
                        effects: raised,
                    }) => {
                        if snapshot.version != current.version {
                            if history_limit > 0 {
                                if history.len() == history_limit {
                                    history.pop_front();
                                }
                                history.push_back(Arc::clone(&current));
                            }
                            current = Arc::new(snapshot);
                            snapshots.send_replace(Arc::clone(&current));
                            debug!(%kind, version = current.version, "event applied");

                            if current.is_ended {
                                info!(session_id = %current.session_id, "session ended");
                            }
                        } else {
                            trace!(%kind, "event accepted without change");
                        }

                        for effect in raised {
                            debug!(?effect, "effect raised");
                            // No subscriber is fine.
                            let _ = effects.send(effect);
                        }
                        Ok(Arc::clone(&current))
                    }
                    Err(err @ FoldError::SessionEnded { .. }) => {
                        debug!(%kind, "event after session end dropped");
                        Err(err)
                    }
                    Err(err) => {
                        warn!(%kind, error = %err, "event rejected");
                        Err(err)
                    }
                };

                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            Command::History { reply } => {
                let _ = reply.send(history.iter().cloned().collect());
            }
        }
    }

    info!(session_id = %current.session_id, "session driver stopped");
}
