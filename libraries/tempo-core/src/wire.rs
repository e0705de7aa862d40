//! Boundary mapping between platform ordinals / JSON and core values
//!
//! Platform layers have shipped several incompatible processing-state
//! enumerations over time. Each one is kept here as an explicit table so an
//! ordinal is always read against the revision that produced it.

use crate::error::WireError;
use crate::types::{
    ActionKind, ActionTag, InterruptionKind, MediaButton, PlaybackSnapshot, ProcessingState,
    RatingStyle, RepeatMode, ShuffleMode, VolumeAdjustment,
};
use serde::{Deserialize, Serialize};

/// Which platform enumeration an ordinal was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProtocolRevision {
    /// `ProcessingState::id()` values
    #[default]
    Current,

    /// Android service enumeration with `none` and `connecting`
    AndroidLegacy,

    /// Swift enumeration with `paused` in place of `ready`
    DarwinSwift,

    /// Objective-C enumeration, six states only
    DarwinObjc,
}

const ANDROID_LEGACY_STATES: [ProcessingState; 12] = [
    ProcessingState::Idle,    // none
    ProcessingState::Loading, // connecting
    ProcessingState::Ready,
    ProcessingState::Buffering,
    ProcessingState::FastForwarding,
    ProcessingState::Rewinding,
    ProcessingState::SkippingToPrevious,
    ProcessingState::SkippingToNext,
    ProcessingState::SkippingToQueueItem,
    ProcessingState::Completed,
    ProcessingState::Stopped,
    ProcessingState::Error,
];

const DARWIN_SWIFT_STATES: [ProcessingState; 12] = [
    ProcessingState::Idle, // none
    ProcessingState::Stopped,
    ProcessingState::Ready, // paused
    ProcessingState::Playing,
    ProcessingState::FastForwarding,
    ProcessingState::Rewinding,
    ProcessingState::Buffering,
    ProcessingState::Error,
    ProcessingState::Loading, // connecting
    ProcessingState::SkippingToPrevious,
    ProcessingState::SkippingToNext,
    ProcessingState::SkippingToQueueItem,
];

const DARWIN_OBJC_STATES: [ProcessingState; 6] = [
    ProcessingState::Idle,
    ProcessingState::Loading,
    ProcessingState::Buffering,
    ProcessingState::Ready,
    ProcessingState::Completed,
    ProcessingState::Error,
];

impl ProtocolRevision {
    /// Ordinal table of this revision
    pub fn processing_states(self) -> &'static [ProcessingState] {
        match self {
            Self::Current => &ProcessingState::ALL,
            Self::AndroidLegacy => &ANDROID_LEGACY_STATES,
            Self::DarwinSwift => &DARWIN_SWIFT_STATES,
            Self::DarwinObjc => &DARWIN_OBJC_STATES,
        }
    }

    /// Read a processing-state ordinal produced by this revision
    pub fn decode_processing_state(self, ordinal: i64) -> Result<ProcessingState, WireError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| self.processing_states().get(index).copied())
            .ok_or_else(|| WireError::unknown_value("processing state", ordinal))
    }

    /// Ordinal for `state` in this revision, if the revision can express it
    pub fn encode_processing_state(self, state: ProcessingState) -> Option<i64> {
        self.processing_states()
            .iter()
            .position(|candidate| *candidate == state)
            .and_then(|index| i64::try_from(index).ok())
    }
}

/// Read a media-action ordinal
pub fn decode_action_tag(ordinal: i64) -> Result<ActionTag, WireError> {
    u8::try_from(ordinal)
        .ok()
        .and_then(ActionTag::from_id)
        .ok_or(WireError::UnknownAction(ordinal))
}

/// Read an interruption ordinal, unknown values become `UnknownPause`
pub fn decode_interruption_kind(ordinal: i64) -> InterruptionKind {
    InterruptionKind::from_id_or_unknown(ordinal)
}

pub fn decode_repeat_mode(ordinal: i64) -> Result<RepeatMode, WireError> {
    u8::try_from(ordinal)
        .ok()
        .and_then(RepeatMode::from_id)
        .ok_or_else(|| WireError::unknown_value("repeat mode", ordinal))
}

pub fn decode_shuffle_mode(ordinal: i64) -> Result<ShuffleMode, WireError> {
    u8::try_from(ordinal)
        .ok()
        .and_then(ShuffleMode::from_id)
        .ok_or_else(|| WireError::unknown_value("shuffle mode", ordinal))
}

pub fn decode_rating_style(ordinal: i64) -> Result<RatingStyle, WireError> {
    u8::try_from(ordinal)
        .ok()
        .and_then(RatingStyle::from_id)
        .ok_or_else(|| WireError::unknown_value("rating style", ordinal))
}

pub fn decode_media_button(ordinal: i64) -> Result<MediaButton, WireError> {
    u8::try_from(ordinal)
        .ok()
        .and_then(MediaButton::from_id)
        .ok_or_else(|| WireError::unknown_value("media button", ordinal))
}

/// Read a signed volume direction (-1 lower, 0 same, 1 raise)
pub fn decode_volume_adjustment(direction: i64) -> Result<VolumeAdjustment, WireError> {
    VolumeAdjustment::from_direction(direction)
        .ok_or_else(|| WireError::unknown_value("volume direction", direction))
}

/// Parse an action from its `{"action": ..., "args": ...}` JSON form
pub fn action_from_json(json: &str) -> Result<ActionKind, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn action_to_json(action: &ActionKind) -> Result<String, WireError> {
    Ok(serde_json::to_string(action)?)
}

/// Serialize a snapshot for publication across the boundary
pub fn snapshot_to_json(snapshot: &PlaybackSnapshot) -> Result<String, WireError> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn snapshot_from_json(json: &str) -> Result<PlaybackSnapshot, WireError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darwin_paused_reads_as_ready() {
        assert_eq!(
            ProtocolRevision::DarwinSwift.decode_processing_state(2).unwrap(),
            ProcessingState::Ready
        );
        assert_eq!(
            ProtocolRevision::DarwinSwift.decode_processing_state(8).unwrap(),
            ProcessingState::Loading
        );
    }

    #[test]
    fn android_connecting_reads_as_loading() {
        let revision = ProtocolRevision::AndroidLegacy;
        assert_eq!(revision.decode_processing_state(0).unwrap(), ProcessingState::Idle);
        assert_eq!(revision.decode_processing_state(1).unwrap(), ProcessingState::Loading);
        assert_eq!(revision.decode_processing_state(11).unwrap(), ProcessingState::Error);
    }

    #[test]
    fn out_of_range_ordinals_are_rejected() {
        assert!(ProtocolRevision::DarwinObjc.decode_processing_state(6).is_err());
        assert!(ProtocolRevision::Current.decode_processing_state(-1).is_err());
        assert!(matches!(decode_action_tag(29), Err(WireError::UnknownAction(29))));
        assert!(decode_repeat_mode(9).is_err());
    }

    #[test]
    fn current_revision_matches_ids() {
        for state in ProcessingState::ALL {
            assert_eq!(
                ProtocolRevision::Current.encode_processing_state(state),
                Some(i64::from(state.id()))
            );
        }
    }

    #[test]
    fn objc_cannot_express_playing() {
        assert_eq!(
            ProtocolRevision::DarwinObjc.encode_processing_state(ProcessingState::Playing),
            None
        );
    }

    #[test]
    fn ordinal_decoders() {
        assert_eq!(decode_action_tag(9).unwrap(), ActionTag::PlayPause);
        assert_eq!(decode_interruption_kind(77), InterruptionKind::UnknownPause);
        assert_eq!(decode_shuffle_mode(2).unwrap(), ShuffleMode::Group);
        assert_eq!(decode_rating_style(6).unwrap(), RatingStyle::Percentage);
        assert_eq!(decode_action_tag(26).unwrap(), ActionTag::Click);
        assert_eq!(decode_media_button(2).unwrap(), MediaButton::Previous);
        assert_eq!(decode_volume_adjustment(-1).unwrap(), VolumeAdjustment::Lower);
        assert!(decode_volume_adjustment(2).is_err());
    }

    #[test]
    fn malformed_action_json() {
        assert!(matches!(
            action_from_json(r#"{"action": "teleport"}"#),
            Err(WireError::Json(_))
        ));
    }
}
