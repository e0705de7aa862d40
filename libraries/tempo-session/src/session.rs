//! Playback session task
//!
//! One tokio task owns the [`PlaybackStateMachine`]. Actions, interruptions
//! and engine events all arrive through a single inbox and are handled one at
//! a time; committed snapshots go out through a broadcast channel.

use crate::config::SessionConfig;
use crate::engine::{AudioEngine, EngineEvent, EngineEventSink};
use crate::machine::{Outcome, PlaybackStateMachine};
use crate::queue::{AnyQueueItem, QueueMembership};
use chrono::Utc;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tempo_core::types::{ActionKind, InterruptionKind, InterruptionPhase, PlaybackSnapshot};
use tempo_core::{BridgeError, SessionError, ValidationError};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Identifies a playback session in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages handled by the session task
#[derive(Debug)]
pub(crate) enum SessionMessage {
    Action {
        action: ActionKind,
        reply: Option<oneshot::Sender<Result<(), ValidationError>>>,
    },
    Interruption {
        kind: InterruptionKind,
        phase: InterruptionPhase,
    },
    Engine(EngineEvent),
    Shutdown,
}

/// Builds and spawns a playback session
pub struct SessionBuilder {
    config: SessionConfig,
    queue: Box<dyn QueueMembership>,
    initial: Option<PlaybackSnapshot>,
    inbox_tx: mpsc::UnboundedSender<SessionMessage>,
    inbox_rx: mpsc::UnboundedReceiver<SessionMessage>,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            config,
            queue: Box::new(AnyQueueItem),
            initial: None,
            inbox_tx,
            inbox_rx,
        }
    }

    /// Queue membership consulted by `skipToQueueItem`
    #[must_use]
    pub fn with_queue(mut self, queue: impl QueueMembership + 'static) -> Self {
        self.queue = Box::new(queue);
        self
    }

    /// Resume from a previously published snapshot
    #[must_use]
    pub fn with_initial_snapshot(mut self, snapshot: PlaybackSnapshot) -> Self {
        self.initial = Some(snapshot);
        self
    }

    /// Sink for the engine to report through, usable before spawning
    pub fn engine_events(&self) -> EngineEventSink {
        EngineEventSink::new(self.inbox_tx.clone())
    }

    /// Spawn the session task on the current tokio runtime
    pub fn spawn(self, engine: impl AudioEngine + 'static) -> Result<SessionHandle, SessionError> {
        self.config.validate()?;

        let id = SessionId::new();
        let initial = self
            .initial
            .unwrap_or_else(|| PlaybackSnapshot::idle_at(Utc::now()));
        let machine = PlaybackStateMachine::with_config(initial.clone(), &self.config);

        let (snapshot_tx, snapshot_rx) = broadcast::channel(self.config.snapshot_buffer);
        let (latest_tx, latest_rx) = watch::channel(initial);

        let actor = SessionActor {
            machine,
            engine: Box::new(engine),
            queue: self.queue,
            snapshots: snapshot_tx,
            latest: latest_tx,
            end_on_stop: self.config.end_session_on_stop,
        };

        let span = info_span!("playback_session", id = %id);
        tokio::spawn(actor.run(self.inbox_rx).instrument(span));

        Ok(SessionHandle {
            id,
            inbox: self.inbox_tx,
            snapshots: Arc::new(snapshot_rx),
            latest: latest_rx,
        })
    }
}

/// Cloneable handle to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    inbox: mpsc::UnboundedSender<SessionMessage>,
    snapshots: Arc<broadcast::Receiver<PlaybackSnapshot>>,
    latest: watch::Receiver<PlaybackSnapshot>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue an action without waiting for its verdict
    pub fn submit_action(&self, action: ActionKind) -> Result<(), SessionError> {
        self.send(SessionMessage::Action {
            action,
            reply: None,
        })
    }

    /// Queue an action and wait for the dispatcher's verdict
    pub async fn dispatch_action(&self, action: ActionKind) -> Result<(), BridgeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionMessage::Action {
            action,
            reply: Some(reply_tx),
        })?;

        let verdict = reply_rx.await.map_err(|_| SessionError::Closed)?;
        Ok(verdict?)
    }

    pub fn submit_interruption(
        &self,
        kind: InterruptionKind,
        phase: InterruptionPhase,
    ) -> Result<(), SessionError> {
        self.send(SessionMessage::Interruption { kind, phase })
    }

    pub fn submit_engine_event(&self, event: EngineEvent) -> Result<(), SessionError> {
        self.send(SessionMessage::Engine(event))
    }

    /// Sink handed to engine implementations
    pub fn engine_events(&self) -> EngineEventSink {
        EngineEventSink::new(self.inbox.clone())
    }

    /// Snapshots published from now on
    pub fn subscribe_snapshots(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshots.resubscribe())
    }

    /// Most recently committed snapshot
    pub fn current_snapshot(&self) -> PlaybackSnapshot {
        self.latest.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }

    /// Stop the session task and wait for it to finish
    pub async fn shutdown(&self) {
        if self.send(SessionMessage::Shutdown).is_ok() {
            self.inbox.closed().await;
        }
    }

    fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.inbox.send(message).map_err(|_| SessionError::Closed)
    }
}

/// Stream of published snapshots
///
/// Ends when the session ends. A subscriber that falls behind by more than
/// the configured buffer skips the missed snapshots.
pub struct SnapshotStream {
    inner: BroadcastStream<PlaybackSnapshot>,
}

impl SnapshotStream {
    fn new(receiver: broadcast::Receiver<PlaybackSnapshot>) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
        }
    }
}

impl Stream for SnapshotStream {
    type Item = PlaybackSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(snapshot))) => return Poll::Ready(Some(snapshot)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                    warn!(skipped, "Snapshot subscriber lagging, skipped snapshots");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

struct SessionActor {
    machine: PlaybackStateMachine,
    engine: Box<dyn AudioEngine>,
    queue: Box<dyn QueueMembership>,
    snapshots: broadcast::Sender<PlaybackSnapshot>,
    latest: watch::Sender<PlaybackSnapshot>,
    end_on_stop: bool,
}

impl SessionActor {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<SessionMessage>) {
        info!(state = %self.machine.snapshot().state, "Playback session started");

        while let Some(message) = inbox.recv().await {
            let keep_running = match message {
                SessionMessage::Action { action, reply } => self.on_action(&action, reply),
                SessionMessage::Interruption { kind, phase } => {
                    debug!(?kind, ?phase, "Interruption");
                    let outcome = self.machine.handle_interruption(kind, phase, Utc::now());
                    self.apply(outcome)
                }
                SessionMessage::Engine(event) => self.on_engine_event(&event),
                SessionMessage::Shutdown => false,
            };

            if !keep_running {
                break;
            }
        }

        info!("Playback session ended");
    }

    fn on_action(
        &mut self,
        action: &ActionKind,
        reply: Option<oneshot::Sender<Result<(), ValidationError>>>,
    ) -> bool {
        let tag = action.tag();
        let result = self
            .machine
            .handle_action(action, self.queue.as_ref(), Utc::now());

        let (verdict, keep_running) = match result {
            Ok(outcome) => (Ok(()), self.apply(outcome)),
            Err(e) => {
                warn!(action = %tag, error = %e, "Rejected action");
                (Err(e), true)
            }
        };

        if let Some(reply) = reply {
            // Caller may have stopped waiting
            reply.send(verdict).ok();
        }
        keep_running
    }

    fn on_engine_event(&mut self, event: &EngineEvent) -> bool {
        let now = Utc::now();
        match self.machine.handle_engine_event(event, now) {
            Ok(outcome) => self.apply(outcome),
            Err(violation) => {
                error!(%violation, "Invariant violation, entering error state");
                let outcome = self.machine.fail_invariant(&violation, now);
                self.apply(outcome)
            }
        }
    }

    /// Publish the snapshot and issue commands, returns whether to keep running
    fn apply(&mut self, outcome: Outcome) -> bool {
        if let Some(snapshot) = outcome.snapshot {
            self.latest.send_replace(snapshot.clone());
            // No subscribers is fine
            self.snapshots.send(snapshot).ok();
        }

        for command in outcome.commands {
            self.engine.issue(command);
        }

        if outcome.stop_acknowledged && self.end_on_stop {
            info!("Stop acknowledged, ending session");
            return false;
        }
        true
    }
}
