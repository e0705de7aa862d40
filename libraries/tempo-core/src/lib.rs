//! Tempo Core
//!
//! Platform-agnostic state model for the Tempo playback bridge.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **State Model**: `ProcessingState`, `ActionKind`, `InterruptionKind`,
//!   `PlaybackSnapshot` and their supporting values
//! - **Error Handling**: rejection, engine and session errors unified under
//!   `BridgeError`
//! - **Wire Mapping**: JSON form and historical platform ordinal tables
//!
//! # Example
//!
//! ```rust
//! use tempo_core::types::{ActionKind, ActionTag, ProcessingState};
//! use tempo_core::wire;
//!
//! let action = wire::action_from_json(r#"{"action": "playPause"}"#).unwrap();
//! assert_eq!(action, ActionKind::PlayPause);
//! assert_eq!(action.tag(), ActionTag::PlayPause);
//!
//! let state = wire::ProtocolRevision::DarwinSwift.decode_processing_state(2).unwrap();
//! assert_eq!(state, ProcessingState::Ready);
//! ```

#![forbid(unsafe_code)]

pub mod duration_ms;
pub mod error;
pub mod types;
pub mod wire;

pub use error::{
    BridgeError, EngineError, InvariantViolation, Result, SessionError, ValidationError,
    WireError, INVARIANT_VIOLATION_CODE,
};

pub use types::{
    ActionCategory, ActionKind, ActionTag, Extras, InterruptionKind, InterruptionPhase,
    MediaButton, MediaId, PlaybackSnapshot, ProcessingPhase, ProcessingState, QueueItemId, Rating,
    RatingStyle, RepeatMode, ShuffleMode, VolumeAdjustment,
};
