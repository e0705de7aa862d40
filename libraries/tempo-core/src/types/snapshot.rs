//! Immutable view of the playback session

use crate::types::{ProcessingState, QueueItemId, Rating, RepeatMode, ShuffleMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Published state of a playback session
///
/// Replaced as a whole on every committed transition, never mutated in place
/// once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub state: ProcessingState,

    /// Position at `update_time`
    #[serde(with = "crate::duration_ms")]
    pub position: Duration,

    #[serde(with = "crate::duration_ms")]
    pub buffered_position: Duration,

    /// Playback rate, always `> 0`
    pub speed: f64,

    pub update_time: DateTime<Utc>,

    pub repeat_mode: RepeatMode,

    pub shuffle_mode: ShuffleMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_item_id: Option<QueueItemId>,

    /// Set while `Ready` because of an interruption rather than the user
    #[serde(default)]
    pub paused_by_system: bool,

    /// Volume is attenuated by a duck interruption
    #[serde(default)]
    pub ducked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PlaybackSnapshot {
    /// Fresh idle snapshot stamped at `now`
    pub fn idle_at(now: DateTime<Utc>) -> Self {
        Self {
            state: ProcessingState::Idle,
            position: Duration::ZERO,
            buffered_position: Duration::ZERO,
            speed: 1.0,
            update_time: now,
            repeat_mode: RepeatMode::None,
            shuffle_mode: ShuffleMode::None,
            rating: None,
            queue_item_id: None,
            paused_by_system: false,
            ducked: false,
            error_code: None,
            error_message: None,
        }
    }

    /// Extrapolated position at `now`
    ///
    /// Only advances while playing; earlier `now` values never move the
    /// position backwards. Saturates at `Duration::MAX`.
    pub fn current_position(&self, now: DateTime<Utc>) -> Duration {
        if self.state != ProcessingState::Playing {
            return self.position;
        }

        let Ok(elapsed) = (now - self.update_time).to_std() else {
            return self.position;
        };

        // Rehydrated snapshots may carry a zero, negative or NaN speed
        let scaled = elapsed.as_secs_f64() * self.speed;
        if scaled.is_nan() || scaled <= 0.0 {
            return self.position;
        }

        let advance = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX);
        self.position.checked_add(advance).unwrap_or(Duration::MAX)
    }

    /// Copy of this snapshot moved into `state` at `now`
    #[must_use]
    pub fn with_state(&self, state: ProcessingState, now: DateTime<Utc>) -> Self {
        Self {
            state,
            update_time: now,
            ..self.clone()
        }
    }

    /// Whether an error code is set
    pub fn has_error(&self) -> bool {
        self.error_code.is_some()
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::idle_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn position_only_advances_while_playing() {
        let mut snapshot = PlaybackSnapshot::idle_at(at(0));
        snapshot.position = Duration::from_secs(5);
        assert_eq!(snapshot.current_position(at(10)), Duration::from_secs(5));

        snapshot.state = ProcessingState::Playing;
        assert_eq!(snapshot.current_position(at(10)), Duration::from_secs(15));
    }

    #[test]
    fn position_scales_with_speed() {
        let mut snapshot = PlaybackSnapshot::idle_at(at(0)).with_state(ProcessingState::Playing, at(0));
        snapshot.speed = 2.0;
        assert_eq!(snapshot.current_position(at(3)), Duration::from_secs(6));
    }

    #[test]
    fn clock_going_backwards_keeps_position() {
        let mut snapshot = PlaybackSnapshot::idle_at(at(10)).with_state(ProcessingState::Playing, at(10));
        snapshot.position = Duration::from_secs(1);
        assert_eq!(snapshot.current_position(at(0)), Duration::from_secs(1));
    }

    #[test]
    fn huge_speed_saturates_instead_of_overflowing() {
        let mut snapshot = PlaybackSnapshot::idle_at(at(0)).with_state(ProcessingState::Playing, at(0));
        snapshot.speed = 1e300;
        assert_eq!(snapshot.current_position(at(1)), Duration::MAX);

        snapshot.speed = f64::INFINITY;
        assert_eq!(snapshot.current_position(at(1)), Duration::MAX);
    }

    #[test]
    fn unusable_speed_keeps_position() {
        let mut snapshot = PlaybackSnapshot::idle_at(at(0)).with_state(ProcessingState::Playing, at(0));
        snapshot.position = Duration::from_secs(4);

        for speed in [0.0, -2.0, f64::NAN] {
            snapshot.speed = speed;
            assert_eq!(snapshot.current_position(at(5)), Duration::from_secs(4));
        }
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_options() {
        let json = serde_json::to_value(PlaybackSnapshot::idle_at(at(0))).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["bufferedPosition"], 0);
        assert_eq!(json["pausedBySystem"], false);
        assert!(json.get("errorCode").is_none());
    }

    #[test]
    fn rehydrates_from_json() {
        let mut snapshot = PlaybackSnapshot::idle_at(at(0)).with_state(ProcessingState::Error, at(1));
        snapshot.error_code = Some(7);
        snapshot.error_message = Some("source unavailable".to_string());
        snapshot.queue_item_id = Some(QueueItemId::new(2));

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: PlaybackSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
