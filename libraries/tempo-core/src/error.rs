/// Error types for the Tempo playback core
use crate::types::{ActionTag, ProcessingState, QueueItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `BridgeError`
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error code published in the snapshot when a transition table has no entry
pub const INVARIANT_VIOLATION_CODE: i32 = -1;

/// Why an inbound action was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Action has no meaning in the current state
    #[error("{action} is not allowed while {state}")]
    IllegalInState {
        action: ActionTag,
        state: ProcessingState,
    },

    /// Payload out of range or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Queue item not present in the current queue
    #[error("Unknown queue item: {0}")]
    UnknownQueueItem(QueueItemId),

    /// Retired action kept for wire compatibility only
    #[error("{0} is deprecated")]
    Deprecated(ActionTag),
}

impl ValidationError {
    /// Create an illegal-in-state rejection
    pub fn illegal(action: ActionTag, state: ProcessingState) -> Self {
        Self::IllegalInState { action, state }
    }

    /// Create an invalid argument rejection
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Failure reported asynchronously by the audio engine
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Engine error {code}: {message}")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    /// Create an engine error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// An event arrived for which the transition table has no entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No transition for {event} while {state}")]
pub struct InvariantViolation {
    pub state: ProcessingState,
    pub event: String,
}

impl InvariantViolation {
    /// Create an invariant violation
    pub fn new(state: ProcessingState, event: impl Into<String>) -> Self {
        Self {
            state,
            event: event.into(),
        }
    }
}

/// Boundary decoding failures
#[derive(Error, Debug)]
pub enum WireError {
    /// Action ordinal outside the known range
    #[error("Unknown action ordinal: {0}")]
    UnknownAction(i64),

    /// Enumerated value outside its table
    #[error("Unknown {kind} ordinal: {id}")]
    UnknownValue { kind: &'static str, id: i64 },

    /// JSON (de)serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WireError {
    /// Create an unknown value error
    pub fn unknown_value(kind: &'static str, id: i64) -> Self {
        Self::UnknownValue { kind, id }
    }
}

/// Session lifecycle failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session task has shut down
    #[error("Playback session is closed")]
    Closed,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Umbrella error for callers that do not care which layer failed
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
