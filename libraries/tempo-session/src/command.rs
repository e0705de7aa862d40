//! Commands issued to the audio engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tempo_core::types::{
    Extras, MediaId, QueueItemId, Rating, RepeatMode, ShuffleMode, VolumeAdjustment,
};
use url::Url;

/// Correlates an issued command with the engine's acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Class of command within which a newer command supersedes an older one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandLane {
    /// Play, pause, stop, prepare, seek and skip
    Transport,
    Rating,
    Repeat,
    Shuffle,
    Speed,
}

/// Operation the engine is asked to perform
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Play,
    Pause,
    Stop,
    SeekTo {
        position: Duration,
    },
    FastForward {
        interval: Duration,
    },
    Rewind {
        interval: Duration,
    },
    /// Start (`begin`) or end a continuous forward seek
    SeekForward {
        begin: bool,
    },
    /// Start (`begin`) or end a continuous backward seek
    SeekBackward {
        begin: bool,
    },
    SkipToPrevious,
    SkipToNext,
    SkipToQueueItem {
        id: QueueItemId,
    },
    PlayFromMediaId {
        media_id: MediaId,
        extras: Extras,
    },
    PlayFromSearch {
        query: String,
        extras: Extras,
    },
    PlayFromUri {
        uri: Url,
        extras: Extras,
    },
    Prepare,
    PrepareFromMediaId {
        media_id: MediaId,
        extras: Extras,
    },
    PrepareFromSearch {
        query: String,
        extras: Extras,
    },
    PrepareFromUri {
        uri: Url,
        extras: Extras,
    },
    SetRating {
        rating: Rating,
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
    /// App-defined action, passed through by name
    Custom {
        name: String,
        extras: Extras,
    },
    /// Remote volume index
    SetVolumeTo {
        volume: u32,
    },
    AdjustVolume {
        adjustment: VolumeAdjustment,
    },
    /// Attenuate output to `gain` while another source has precedence
    Duck {
        gain: f32,
    },
    Unduck,
}

impl EngineCommand {
    /// Lane this command supersedes within, `None` for fire-and-forget commands
    pub fn lane(&self) -> Option<CommandLane> {
        match self {
            Self::SetRating { .. } => Some(CommandLane::Rating),
            Self::SetRepeatMode { .. } => Some(CommandLane::Repeat),
            Self::SetShuffleMode { .. } => Some(CommandLane::Shuffle),
            Self::SetSpeed { .. } => Some(CommandLane::Speed),
            Self::Custom { .. }
            | Self::SetVolumeTo { .. }
            | Self::AdjustVolume { .. }
            | Self::Duck { .. }
            | Self::Unduck => None,
            _ => Some(CommandLane::Transport),
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::SeekTo { .. } => "seekTo",
            Self::FastForward { .. } => "fastForward",
            Self::Rewind { .. } => "rewind",
            Self::SeekForward { .. } => "seekForward",
            Self::SeekBackward { .. } => "seekBackward",
            Self::SkipToPrevious => "skipToPrevious",
            Self::SkipToNext => "skipToNext",
            Self::SkipToQueueItem { .. } => "skipToQueueItem",
            Self::PlayFromMediaId { .. } => "playFromMediaId",
            Self::PlayFromSearch { .. } => "playFromSearch",
            Self::PlayFromUri { .. } => "playFromUri",
            Self::Prepare => "prepare",
            Self::PrepareFromMediaId { .. } => "prepareFromMediaId",
            Self::PrepareFromSearch { .. } => "prepareFromSearch",
            Self::PrepareFromUri { .. } => "prepareFromUri",
            Self::SetRating { .. } => "setRating",
            Self::SetRepeatMode { .. } => "setRepeatMode",
            Self::SetShuffleMode { .. } => "setShuffleMode",
            Self::SetSpeed { .. } => "setSpeed",
            Self::Custom { .. } => "custom",
            Self::SetVolumeTo { .. } => "setVolumeTo",
            Self::AdjustVolume { .. } => "adjustVolume",
            Self::Duck { .. } => "duck",
            Self::Unduck => "unduck",
        }
    }
}

/// A command paired with the id the engine acknowledges it by
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCommand {
    pub id: CommandId,
    pub command: EngineCommand,
}
