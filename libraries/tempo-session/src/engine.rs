//! Audio engine collaborator
//!
//! The engine performs commands asynchronously and reports back through an
//! [`EngineEventSink`]. It never touches the playback snapshot directly.

use crate::command::{CommandId, IssuedCommand};
use crate::session::SessionMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempo_core::{EngineError, SessionError};
use tokio::sync::mpsc;

/// Platform audio engine
///
/// `issue` must not block: implementations queue the command and acknowledge
/// it later through the event sink.
pub trait AudioEngine: Send {
    /// Hand a command to the engine
    fn issue(&mut self, command: IssuedCommand);
}

impl<E: AudioEngine + ?Sized> AudioEngine for Box<E> {
    fn issue(&mut self, command: IssuedCommand) {
        (**self).issue(command);
    }
}

/// Autonomous status reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineStatus {
    Buffering,
    Ready,
    Completed,
}

/// Asynchronous report from the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    /// Command with this id has been carried out
    Acknowledged(CommandId),

    /// Playback position moved
    Progress {
        #[serde(with = "tempo_core::duration_ms")]
        position: Duration,
        #[serde(with = "tempo_core::duration_ms")]
        buffered_position: Duration,
    },

    Status(EngineStatus),

    /// Unrecoverable engine failure
    Failed(EngineError),
}

impl EngineEvent {
    /// Short description used in logs and invariant reports
    pub fn describe(&self) -> String {
        match self {
            Self::Acknowledged(id) => format!("acknowledged({id})"),
            Self::Progress { position, .. } => format!("progress({}ms)", position.as_millis()),
            Self::Status(status) => format!("status({status:?})"),
            Self::Failed(failure) => format!("failed({})", failure.code),
        }
    }
}

/// Handle the engine uses to report events into its session
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    inbox: mpsc::UnboundedSender<SessionMessage>,
}

impl EngineEventSink {
    pub(crate) fn new(inbox: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { inbox }
    }

    /// Report an event, fails once the session has ended
    pub fn send(&self, event: EngineEvent) -> Result<(), SessionError> {
        self.inbox
            .send(SessionMessage::Engine(event))
            .map_err(|_| SessionError::Closed)
    }

    pub fn acknowledge(&self, id: CommandId) -> Result<(), SessionError> {
        self.send(EngineEvent::Acknowledged(id))
    }

    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }
}
