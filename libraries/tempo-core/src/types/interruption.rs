//! Audio-session interruptions raised by the platform

use serde::{Deserialize, Serialize};

/// Kind of externally-originated interruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterruptionKind {
    /// Permanent loss of audio focus, never resumes on its own
    Pause,

    /// Transient loss (e.g. a phone call), may resume when it ends
    TemporaryPause,

    /// Another source needs brief precedence, attenuate instead of pausing
    TemporaryDuck,

    /// Unrecognized system pause, handled like `Pause`
    UnknownPause,

    /// Audio output became noisy (headphones unplugged), handled like `Pause`
    BecomingNoisy,
}

impl InterruptionKind {
    /// Every variant in id order
    pub const ALL: [InterruptionKind; 5] = [
        Self::Pause,
        Self::TemporaryPause,
        Self::TemporaryDuck,
        Self::UnknownPause,
        Self::BecomingNoisy,
    ];

    /// Stable wire id
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Pause => 0,
            Self::TemporaryPause => 1,
            Self::TemporaryDuck => 2,
            Self::UnknownPause => 3,
            Self::BecomingNoisy => 4,
        }
    }

    /// Look up a kind by id, falling back to `UnknownPause`
    ///
    /// Kinds introduced by newer peers are handled conservatively: stop and
    /// never auto-resume.
    #[must_use]
    pub fn from_id_or_unknown(id: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| i64::from(kind.id()) == id)
            .unwrap_or(Self::UnknownPause)
    }

    /// Whether the interruption pauses playback for good
    pub fn is_permanent(self) -> bool {
        matches!(self, Self::Pause | Self::UnknownPause | Self::BecomingNoisy)
    }
}

/// Whether an interruption is starting or finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterruptionPhase {
    /// Interruption started
    Began,
    /// Interruption finished
    Ended,
}
