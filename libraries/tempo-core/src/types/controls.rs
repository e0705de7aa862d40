//! Hardware media buttons and remote volume control

use serde::{Deserialize, Serialize};

/// Physical or headset media button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaButton {
    /// Play/pause or headset hook
    Media,
    Next,
    Previous,
}

impl MediaButton {
    /// Every variant in id order
    pub const ALL: [MediaButton; 3] = [Self::Media, Self::Next, Self::Previous];

    /// Stable wire id
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Media => 0,
            Self::Next => 1,
            Self::Previous => 2,
        }
    }

    /// Look up by wire id
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.id() == id)
    }
}

/// Relative step requested by a remote volume controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeAdjustment {
    Lower,
    Same,
    Raise,
}

impl VolumeAdjustment {
    /// Every variant in wire order
    pub const ALL: [VolumeAdjustment; 3] = [Self::Lower, Self::Same, Self::Raise];

    /// Signed platform direction, -1, 0 or 1
    #[must_use]
    pub fn direction(self) -> i8 {
        match self {
            Self::Lower => -1,
            Self::Same => 0,
            Self::Raise => 1,
        }
    }

    #[must_use]
    pub fn from_direction(direction: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|adjustment| i64::from(adjustment.direction()) == direction)
    }
}
