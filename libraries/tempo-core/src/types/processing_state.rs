//! Processing state of the audio engine
//!
//! Each variant carries an explicit wire id. Ids are assigned once and never
//! reused: new variants are appended with the next free id.

use serde::{Deserialize, Serialize};

/// Current phase of the engine's playback lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingState {
    /// Nothing loaded
    #[default]
    Idle,

    /// Media is being opened
    Loading,

    /// Waiting for enough data to continue
    Buffering,

    /// Loaded and paused
    Ready,

    /// Producing audio
    Playing,

    /// Jumping forward by the fast-forward interval (or continuous seek)
    FastForwarding,

    /// Jumping backward by the rewind interval (or continuous seek)
    Rewinding,

    /// Moving to the previous queue item
    SkippingToPrevious,

    /// Moving to the next queue item
    SkippingToNext,

    /// Moving to an explicit queue item
    SkippingToQueueItem,

    /// Reached the end of the media
    Completed,

    /// Explicitly stopped
    Stopped,

    /// Engine reported a failure
    Error,
}

/// Coarse phase used where several states share one meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingPhase {
    /// Idle, nothing loaded
    Idle,
    /// Loading, buffering and the legacy "connecting" state
    Buffering,
    /// Ready or completed, not producing audio
    Paused,
    /// Playing
    Playing,
    /// Seeking or skipping
    Transitioning,
    /// Stopped or errored
    Terminal,
}

impl ProcessingState {
    /// Every variant in id order
    pub const ALL: [ProcessingState; 13] = [
        Self::Idle,
        Self::Loading,
        Self::Buffering,
        Self::Ready,
        Self::Playing,
        Self::FastForwarding,
        Self::Rewinding,
        Self::SkippingToPrevious,
        Self::SkippingToNext,
        Self::SkippingToQueueItem,
        Self::Completed,
        Self::Stopped,
        Self::Error,
    ];

    /// Stable wire id
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Loading => 1,
            Self::Buffering => 2,
            Self::Ready => 3,
            Self::Playing => 4,
            Self::FastForwarding => 5,
            Self::Rewinding => 6,
            Self::SkippingToPrevious => 7,
            Self::SkippingToNext => 8,
            Self::SkippingToQueueItem => 9,
            Self::Completed => 10,
            Self::Stopped => 11,
            Self::Error => 12,
        }
    }

    /// Look up a state by its stable wire id
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.id() == id)
    }

    /// Stopped and error only leave through an explicit prepare/play action
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Error)
    }

    /// States that settle into another one once the engine catches up
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Loading
                | Self::Buffering
                | Self::FastForwarding
                | Self::Rewinding
                | Self::SkippingToPrevious
                | Self::SkippingToNext
                | Self::SkippingToQueueItem
        )
    }

    /// Whether the engine is (or is about to be) producing audio
    pub fn is_active(self) -> bool {
        self == Self::Playing || self.is_transient()
    }

    /// Collapse the state into its coarse phase
    ///
    /// `Loading` and `Buffering` share the buffering phase.
    pub fn phase(self) -> ProcessingPhase {
        match self {
            Self::Idle => ProcessingPhase::Idle,
            Self::Loading | Self::Buffering => ProcessingPhase::Buffering,
            Self::Ready | Self::Completed => ProcessingPhase::Paused,
            Self::Playing => ProcessingPhase::Playing,
            Self::FastForwarding
            | Self::Rewinding
            | Self::SkippingToPrevious
            | Self::SkippingToNext
            | Self::SkippingToQueueItem => ProcessingPhase::Transitioning,
            Self::Stopped | Self::Error => ProcessingPhase::Terminal,
        }
    }

    /// Convert to string representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Buffering => "buffering",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::FastForwarding => "fastForwarding",
            Self::Rewinding => "rewinding",
            Self::SkippingToPrevious => "skippingToPrevious",
            Self::SkippingToNext => "skippingToNext",
            Self::SkippingToQueueItem => "skippingToQueueItem",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
