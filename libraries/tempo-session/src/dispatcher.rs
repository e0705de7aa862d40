//! Action dispatch
//!
//! Maps an inbound action to exactly one engine command, or explains why the
//! action is rejected. Checks run in a fixed order: retired actions first,
//! then legality in the current state, then payload validity.
//!
//! Dispatch is pure: the same snapshot, action and context always give the
//! same verdict.

use crate::command::EngineCommand;
use crate::queue::QueueMembership;
use std::time::Duration;
use tempo_core::types::{
    ActionCategory, ActionKind, ActionTag, MediaButton, MediaId, PlaybackSnapshot, ProcessingState,
};
use tempo_core::ValidationError;
use url::Url;

/// Intervals applied to relative seeks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub fast_forward_interval: Duration,
    pub rewind_interval: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            fast_forward_interval: Duration::from_secs(10),
            rewind_interval: Duration::from_secs(10),
        }
    }
}

/// Where an unacknowledged transport command is taking playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportIntent {
    Play,
    Pause,
}

/// Read-only collaborators consulted during dispatch
#[derive(Clone, Copy)]
pub struct DispatchContext<'a> {
    pub queue: &'a dyn QueueMembership,
    pub policy: DispatchPolicy,

    /// Intent of the in-flight transport command, if any
    pub intent: Option<TransportIntent>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(queue: &'a dyn QueueMembership, policy: DispatchPolicy) -> Self {
        Self {
            queue,
            policy,
            intent: None,
        }
    }

    #[must_use]
    pub fn with_intent(mut self, intent: Option<TransportIntent>) -> Self {
        self.intent = intent;
        self
    }
}

/// Resolve `playPause` against the state playback is heading to
pub fn resolve_toggle(state: ProcessingState, intent: Option<TransportIntent>) -> ActionTag {
    let heading_to_play = match intent {
        Some(TransportIntent::Play) => true,
        Some(TransportIntent::Pause) => false,
        None => state == ProcessingState::Playing,
    };
    if heading_to_play {
        ActionTag::Pause
    } else {
        ActionTag::Play
    }
}

/// Whether an action of `category` may run given `snapshot`
///
/// `Toggle` must be resolved first; `Legacy` is never legal. A pending play
/// can be paused and a pending pause can be played before the engine
/// acknowledges either.
pub fn is_legal(
    category: ActionCategory,
    snapshot: &PlaybackSnapshot,
    intent: Option<TransportIntent>,
) -> bool {
    use ActionCategory as C;
    use ProcessingState as S;

    if category == C::Legacy {
        return false;
    }

    match snapshot.state {
        S::Loading
        | S::Buffering
        | S::FastForwarding
        | S::Rewinding
        | S::SkippingToPrevious
        | S::SkippingToNext
        | S::SkippingToQueueItem => true,
        S::Idle => !matches!(category, C::Pause | C::Transport),
        // Pausing an already paused session only confirms a system pause
        S::Ready => {
            category != C::Pause
                || snapshot.paused_by_system
                || intent == Some(TransportIntent::Play)
        }
        S::Playing => category != C::Play || intent == Some(TransportIntent::Pause),
        S::Completed => category != C::Pause,
        S::Stopped => !matches!(category, C::Pause | C::Transport | C::Skip),
        S::Error => matches!(category, C::Play | C::PlayFrom | C::Prepare),
    }
}

/// Validate `action` against `snapshot` and translate it into an engine command
pub fn dispatch(
    snapshot: &PlaybackSnapshot,
    action: &ActionKind,
    context: &DispatchContext<'_>,
) -> Result<EngineCommand, ValidationError> {
    let tag = action.tag();
    if tag.is_deprecated() {
        return Err(ValidationError::Deprecated(tag));
    }

    let effective = match action {
        ActionKind::PlayPause
        | ActionKind::Click {
            button: MediaButton::Media,
        } => resolve_toggle(snapshot.state, context.intent),
        ActionKind::Click {
            button: MediaButton::Next,
        } => ActionTag::SkipToNext,
        ActionKind::Click {
            button: MediaButton::Previous,
        } => ActionTag::SkipToPrevious,
        _ => tag,
    };
    if !is_legal(effective.category(), snapshot, context.intent) {
        return Err(ValidationError::illegal(tag, snapshot.state));
    }

    let command = match action {
        ActionKind::Stop => EngineCommand::Stop,
        ActionKind::Pause => EngineCommand::Pause,
        ActionKind::Play => EngineCommand::Play,
        ActionKind::PlayPause | ActionKind::Click { .. } => match effective {
            ActionTag::Pause => EngineCommand::Pause,
            ActionTag::SkipToNext => EngineCommand::SkipToNext,
            ActionTag::SkipToPrevious => EngineCommand::SkipToPrevious,
            _ => EngineCommand::Play,
        },
        ActionKind::Rewind => EngineCommand::Rewind {
            interval: context.policy.rewind_interval,
        },
        ActionKind::FastForward => EngineCommand::FastForward {
            interval: context.policy.fast_forward_interval,
        },
        ActionKind::SeekTo { position } => EngineCommand::SeekTo {
            position: *position,
        },
        ActionKind::SeekBackward { begin } => EngineCommand::SeekBackward { begin: *begin },
        ActionKind::SeekForward { begin } => EngineCommand::SeekForward { begin: *begin },
        ActionKind::SkipToPrevious => EngineCommand::SkipToPrevious,
        ActionKind::SkipToNext => EngineCommand::SkipToNext,
        ActionKind::SkipToQueueItem { id } => {
            if !context.queue.contains(id) {
                return Err(ValidationError::UnknownQueueItem(*id));
            }
            EngineCommand::SkipToQueueItem { id: *id }
        }
        ActionKind::PlayFromMediaId { media_id, extras } => EngineCommand::PlayFromMediaId {
            media_id: require_media_id(media_id)?,
            extras: extras.clone(),
        },
        ActionKind::PlayFromSearch { query, extras } => EngineCommand::PlayFromSearch {
            query: query.clone(),
            extras: extras.clone(),
        },
        ActionKind::PlayFromUri { uri, extras } => EngineCommand::PlayFromUri {
            uri: parse_uri(uri)?,
            extras: extras.clone(),
        },
        ActionKind::Prepare => EngineCommand::Prepare,
        ActionKind::PrepareFromMediaId { media_id, extras } => {
            EngineCommand::PrepareFromMediaId {
                media_id: require_media_id(media_id)?,
                extras: extras.clone(),
            }
        }
        ActionKind::PrepareFromSearch { query, extras } => EngineCommand::PrepareFromSearch {
            query: query.clone(),
            extras: extras.clone(),
        },
        ActionKind::PrepareFromUri { uri, extras } => EngineCommand::PrepareFromUri {
            uri: parse_uri(uri)?,
            extras: extras.clone(),
        },
        ActionKind::SetRating { rating, extras } => {
            rating
                .validate()
                .map_err(ValidationError::invalid_argument)?;
            EngineCommand::SetRating {
                rating: *rating,
                extras: extras.clone(),
            }
        }
        ActionKind::SetRepeatMode { mode } => EngineCommand::SetRepeatMode { mode: *mode },
        ActionKind::SetShuffleMode { mode } => EngineCommand::SetShuffleMode { mode: *mode },
        ActionKind::SetSpeed { speed } => {
            if !speed.is_finite() || *speed <= 0.0 {
                return Err(ValidationError::invalid_argument(format!(
                    "speed must be a positive finite number, got {speed}"
                )));
            }
            EngineCommand::SetSpeed { speed: *speed }
        }
        ActionKind::CustomAction { name, extras } => {
            if name.trim().is_empty() {
                return Err(ValidationError::invalid_argument(
                    "custom action name must not be empty",
                ));
            }
            EngineCommand::Custom {
                name: name.clone(),
                extras: extras.clone(),
            }
        }
        ActionKind::SetVolumeTo { volume } => EngineCommand::SetVolumeTo { volume: *volume },
        ActionKind::AdjustVolume { adjustment } => EngineCommand::AdjustVolume {
            adjustment: *adjustment,
        },
        ActionKind::SetShuffleModeEnabled { .. } | ActionKind::SetCaptioningEnabled { .. } => {
            return Err(ValidationError::Deprecated(tag));
        }
    };

    Ok(command)
}

fn require_media_id(media_id: &MediaId) -> Result<MediaId, ValidationError> {
    if media_id.is_empty() {
        return Err(ValidationError::invalid_argument("media id must not be empty"));
    }
    Ok(media_id.clone())
}

fn parse_uri(uri: &str) -> Result<Url, ValidationError> {
    Url::parse(uri).map_err(|e| ValidationError::invalid_argument(format!("invalid uri {uri:?}: {e}")))
}
