//! Remote-control / media actions
//!
//! `ActionKind` is the full command vocabulary with payloads, `ActionTag` its
//! payload-free discriminant carrying the stable wire id.

use crate::types::{
    MediaButton, MediaId, QueueItemId, Rating, RepeatMode, ShuffleMode, VolumeAdjustment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Free-form extras forwarded untouched to the engine
pub type Extras = BTreeMap<String, serde_json::Value>;

/// An action requested by the user or a media controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    content = "args",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ActionKind {
    Stop,
    Pause,
    Play,
    PlayPause,
    Rewind,
    FastForward,
    SeekTo {
        #[serde(with = "crate::duration_ms")]
        position: Duration,
    },
    /// Continuous backward seek, `begin` marks press and release
    SeekBackward {
        begin: bool,
    },
    /// Continuous forward seek, `begin` marks press and release
    SeekForward {
        begin: bool,
    },
    SkipToPrevious,
    SkipToNext,
    SkipToQueueItem {
        id: QueueItemId,
    },
    PlayFromMediaId {
        media_id: MediaId,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    PlayFromSearch {
        query: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    PlayFromUri {
        uri: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    Prepare,
    PrepareFromMediaId {
        media_id: MediaId,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    PrepareFromSearch {
        query: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    PrepareFromUri {
        uri: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    SetRating {
        rating: Rating,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    SetRepeatMode {
        mode: RepeatMode,
    },
    SetShuffleMode {
        mode: ShuffleMode,
    },
    SetSpeed {
        speed: f64,
    },
    /// Legacy boolean shuffle toggle, superseded by `SetShuffleMode`
    SetShuffleModeEnabled {
        enabled: bool,
    },
    /// Legacy captioning toggle, removed from the platform API
    SetCaptioningEnabled {
        enabled: bool,
    },
    /// App-defined action forwarded to the engine by name
    CustomAction {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extras: Extras,
    },
    /// Media button press, resolved against the current state
    Click {
        button: MediaButton,
    },
    /// Absolute volume from a remote controller
    SetVolumeTo {
        volume: u32,
    },
    /// Relative volume step from a remote controller
    AdjustVolume {
        adjustment: VolumeAdjustment,
    },
}

impl ActionKind {
    /// Payload-free discriminant
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::Stop => ActionTag::Stop,
            Self::Pause => ActionTag::Pause,
            Self::Play => ActionTag::Play,
            Self::PlayPause => ActionTag::PlayPause,
            Self::Rewind => ActionTag::Rewind,
            Self::FastForward => ActionTag::FastForward,
            Self::SeekTo { .. } => ActionTag::SeekTo,
            Self::SeekBackward { .. } => ActionTag::SeekBackward,
            Self::SeekForward { .. } => ActionTag::SeekForward,
            Self::SkipToPrevious => ActionTag::SkipToPrevious,
            Self::SkipToNext => ActionTag::SkipToNext,
            Self::SkipToQueueItem { .. } => ActionTag::SkipToQueueItem,
            Self::PlayFromMediaId { .. } => ActionTag::PlayFromMediaId,
            Self::PlayFromSearch { .. } => ActionTag::PlayFromSearch,
            Self::PlayFromUri { .. } => ActionTag::PlayFromUri,
            Self::Prepare => ActionTag::Prepare,
            Self::PrepareFromMediaId { .. } => ActionTag::PrepareFromMediaId,
            Self::PrepareFromSearch { .. } => ActionTag::PrepareFromSearch,
            Self::PrepareFromUri { .. } => ActionTag::PrepareFromUri,
            Self::SetRating { .. } => ActionTag::SetRating,
            Self::SetRepeatMode { .. } => ActionTag::SetRepeatMode,
            Self::SetShuffleMode { .. } => ActionTag::SetShuffleMode,
            Self::SetSpeed { .. } => ActionTag::SetSpeed,
            Self::SetShuffleModeEnabled { .. } => ActionTag::SetShuffleModeEnabled,
            Self::SetCaptioningEnabled { .. } => ActionTag::SetCaptioningEnabled,
            Self::CustomAction { .. } => ActionTag::CustomAction,
            Self::Click { .. } => ActionTag::Click,
            Self::SetVolumeTo { .. } => ActionTag::SetVolumeTo,
            Self::AdjustVolume { .. } => ActionTag::AdjustVolume,
        }
    }
}

/// Action discriminant with a stable wire id
///
/// Ids follow the platform media-action ordinals, including the retired
/// slots 19 and 20. Actions without a platform ordinal are appended after
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionTag {
    Stop,
    Pause,
    Play,
    Rewind,
    SkipToPrevious,
    SkipToNext,
    FastForward,
    SetRating,
    SeekTo,
    PlayPause,
    PlayFromMediaId,
    PlayFromSearch,
    SkipToQueueItem,
    PlayFromUri,
    Prepare,
    PrepareFromMediaId,
    PrepareFromSearch,
    PrepareFromUri,
    SetRepeatMode,
    SetShuffleModeEnabled,
    SetCaptioningEnabled,
    SetShuffleMode,
    SeekBackward,
    SeekForward,
    SetSpeed,
    CustomAction,
    Click,
    SetVolumeTo,
    AdjustVolume,
}

/// Groups of actions sharing one row of the legality table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    /// `play`
    Play,
    /// `playPause` and media button clicks, resolved against the current state
    Toggle,
    /// `playFromMediaId`, `playFromSearch`, `playFromUri`
    PlayFrom,
    /// `prepare` and its `prepareFrom*` variants
    Prepare,
    Pause,
    Stop,
    /// Seeks, fast-forward and rewind
    Transport,
    /// Queue navigation
    Skip,
    /// Rating, repeat, shuffle, speed and remote volume
    Setting,
    /// App-defined actions
    Custom,
    /// Recognized for wire compatibility, never dispatched
    Legacy,
}

impl ActionTag {
    /// Every variant in id order
    pub const ALL: [ActionTag; 29] = [
        Self::Stop,
        Self::Pause,
        Self::Play,
        Self::Rewind,
        Self::SkipToPrevious,
        Self::SkipToNext,
        Self::FastForward,
        Self::SetRating,
        Self::SeekTo,
        Self::PlayPause,
        Self::PlayFromMediaId,
        Self::PlayFromSearch,
        Self::SkipToQueueItem,
        Self::PlayFromUri,
        Self::Prepare,
        Self::PrepareFromMediaId,
        Self::PrepareFromSearch,
        Self::PrepareFromUri,
        Self::SetRepeatMode,
        Self::SetShuffleModeEnabled,
        Self::SetCaptioningEnabled,
        Self::SetShuffleMode,
        Self::SeekBackward,
        Self::SeekForward,
        Self::SetSpeed,
        Self::CustomAction,
        Self::Click,
        Self::SetVolumeTo,
        Self::AdjustVolume,
    ];

    /// Stable wire id
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Stop => 0,
            Self::Pause => 1,
            Self::Play => 2,
            Self::Rewind => 3,
            Self::SkipToPrevious => 4,
            Self::SkipToNext => 5,
            Self::FastForward => 6,
            Self::SetRating => 7,
            Self::SeekTo => 8,
            Self::PlayPause => 9,
            Self::PlayFromMediaId => 10,
            Self::PlayFromSearch => 11,
            Self::SkipToQueueItem => 12,
            Self::PlayFromUri => 13,
            Self::Prepare => 14,
            Self::PrepareFromMediaId => 15,
            Self::PrepareFromSearch => 16,
            Self::PrepareFromUri => 17,
            Self::SetRepeatMode => 18,
            Self::SetShuffleModeEnabled => 19,
            Self::SetCaptioningEnabled => 20,
            Self::SetShuffleMode => 21,
            Self::SeekBackward => 22,
            Self::SeekForward => 23,
            Self::SetSpeed => 24,
            Self::CustomAction => 25,
            Self::Click => 26,
            Self::SetVolumeTo => 27,
            Self::AdjustVolume => 28,
        }
    }

    /// Look up by wire id
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.id() == id)
    }

    /// Row of the legality table this action belongs to
    pub fn category(self) -> ActionCategory {
        match self {
            Self::Play => ActionCategory::Play,
            Self::PlayPause | Self::Click => ActionCategory::Toggle,
            Self::PlayFromMediaId | Self::PlayFromSearch | Self::PlayFromUri => {
                ActionCategory::PlayFrom
            }
            Self::Prepare
            | Self::PrepareFromMediaId
            | Self::PrepareFromSearch
            | Self::PrepareFromUri => ActionCategory::Prepare,
            Self::Pause => ActionCategory::Pause,
            Self::Stop => ActionCategory::Stop,
            Self::Rewind
            | Self::FastForward
            | Self::SeekTo
            | Self::SeekBackward
            | Self::SeekForward => ActionCategory::Transport,
            Self::SkipToPrevious | Self::SkipToNext | Self::SkipToQueueItem => {
                ActionCategory::Skip
            }
            Self::SetRating
            | Self::SetRepeatMode
            | Self::SetShuffleMode
            | Self::SetSpeed
            | Self::SetVolumeTo
            | Self::AdjustVolume => ActionCategory::Setting,
            Self::CustomAction => ActionCategory::Custom,
            Self::SetShuffleModeEnabled | Self::SetCaptioningEnabled => ActionCategory::Legacy,
        }
    }

    /// Retired actions kept only so older peers stay wire compatible
    pub fn is_deprecated(self) -> bool {
        self.category() == ActionCategory::Legacy
    }
}

impl std::fmt::Display for ActionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
