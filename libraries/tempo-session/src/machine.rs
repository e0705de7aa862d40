//! Playback state machine
//!
//! The single mutable authority over a session's [`PlaybackSnapshot`].
//! Actions, interruptions and engine events all come through here; each one
//! either commits a complete new snapshot or leaves the current one alone.
//!
//! Transitions happen at two points:
//! - **issue time**, for outcomes that are certain as soon as the command is
//!   sent (`stop`, entering a seek/skip, starting to load)
//! - **acknowledgement time**, when the engine reports the latest command of
//!   a lane as done
//!
//! Each [`CommandLane`] only tracks its newest command, so an acknowledgement
//! for a superseded command is dropped.

use crate::command::{CommandId, CommandLane, EngineCommand, IssuedCommand};
use crate::config::SessionConfig;
use crate::dispatcher::{dispatch, DispatchContext, DispatchPolicy, TransportIntent};
use crate::engine::{EngineEvent, EngineStatus};
use crate::queue::QueueMembership;
use crate::reconciler::{reconcile, InterruptionMemo};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tempo_core::types::{
    ActionKind, InterruptionKind, InterruptionPhase, PlaybackSnapshot, ProcessingPhase,
    ProcessingState, QueueItemId, Rating, RepeatMode, ShuffleMode,
};
use tempo_core::{InvariantViolation, ValidationError, INVARIANT_VIOLATION_CODE};
use tracing::{debug, error, info};

/// What a handled input produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Newly committed snapshot, to be published
    pub snapshot: Option<PlaybackSnapshot>,

    /// Commands to hand to the engine, in order
    pub commands: Vec<IssuedCommand>,

    /// The engine confirmed a `stop`
    pub stop_acknowledged: bool,
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none() && self.commands.is_empty() && !self.stop_acknowledged
    }
}

/// Snapshot change applied when a command is acknowledged
#[derive(Debug, Clone, PartialEq)]
enum AckEffect {
    /// Settle into a fixed state and drop any system pause
    Settle(ProcessingState),

    /// Return to the resume target
    Resume {
        position: Option<Duration>,
        queue_item_id: Option<QueueItemId>,
    },

    /// Already committed at issue time
    Confirm,

    Stopped,
    Rating(Rating),
    RepeatMode(RepeatMode),
    ShuffleMode(ShuffleMode),
    Speed(f64),
}

impl AckEffect {
    fn resume() -> Self {
        Self::Resume {
            position: None,
            queue_item_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PendingCommand {
    id: CommandId,
    effect: AckEffect,
}

/// Playback state machine for one session
#[derive(Debug)]
pub struct PlaybackStateMachine {
    snapshot: PlaybackSnapshot,

    /// Settled state a transient state returns to
    resume_target: ProcessingState,

    pending: HashMap<CommandLane, PendingCommand>,
    memo: Option<InterruptionMemo>,

    /// Accepted user actions so far
    action_seq: u64,

    next_command_id: u64,
    policy: DispatchPolicy,
    duck_gain: f32,
}

impl PlaybackStateMachine {
    /// Create a machine starting from `initial`
    pub fn new(initial: PlaybackSnapshot, policy: DispatchPolicy, duck_gain: f32) -> Self {
        let resume_target = if initial.state == ProcessingState::Playing {
            ProcessingState::Playing
        } else {
            ProcessingState::Ready
        };

        Self {
            snapshot: initial,
            resume_target,
            pending: HashMap::new(),
            memo: None,
            action_seq: 0,
            next_command_id: 1,
            policy,
            duck_gain,
        }
    }

    pub fn with_config(initial: PlaybackSnapshot, config: &SessionConfig) -> Self {
        let policy = DispatchPolicy {
            fast_forward_interval: config.fast_forward_interval(),
            rewind_interval: config.rewind_interval(),
        };
        Self::new(initial, policy, config.duck_gain)
    }

    pub fn snapshot(&self) -> &PlaybackSnapshot {
        &self.snapshot
    }

    pub fn resume_target(&self) -> ProcessingState {
        self.resume_target
    }

    pub fn action_seq(&self) -> u64 {
        self.action_seq
    }

    pub fn memo(&self) -> Option<InterruptionMemo> {
        self.memo
    }

    /// Newest in-flight command of `lane`
    pub fn pending_command(&self, lane: CommandLane) -> Option<CommandId> {
        self.pending.get(&lane).map(|pending| pending.id)
    }

    /// Validate and apply a user action
    pub fn handle_action(
        &mut self,
        action: &ActionKind,
        queue: &dyn QueueMembership,
        now: DateTime<Utc>,
    ) -> Result<Outcome, ValidationError> {
        let current = self.snapshot.state;

        if matches!(action, ActionKind::Stop) && current == ProcessingState::Stopped {
            debug!("Ignoring stop, session already stopped");
            return Ok(Outcome::default());
        }

        let context =
            DispatchContext::new(queue, self.policy).with_intent(self.transport_intent());
        let command = dispatch(&self.snapshot, action, &context)?;
        self.action_seq += 1;

        let (issue_state, effect) = plan(&command, current);
        let mut candidate = self.snapshot.clone();

        if command.lane() == Some(CommandLane::Transport) {
            candidate.paused_by_system = false;
        }
        if let Some(state) = issue_state {
            candidate.state = state;
            if state == ProcessingState::Loading {
                candidate.error_code = None;
                candidate.error_message = None;
            }
        }

        let mut outcome = Outcome::default();
        if candidate.state != current
            || candidate.paused_by_system != self.snapshot.paused_by_system
        {
            candidate.update_time = now;
            outcome.snapshot = Some(self.commit(candidate));
        }

        outcome.commands.push(self.issue(command, Some(effect)));
        Ok(outcome)
    }

    /// Apply a platform interruption
    pub fn handle_interruption(
        &mut self,
        kind: InterruptionKind,
        phase: InterruptionPhase,
        now: DateTime<Utc>,
    ) -> Outcome {
        let reconciliation = reconcile(
            &self.snapshot,
            self.memo,
            self.action_seq,
            kind,
            phase,
            self.duck_gain,
            now,
        );
        self.memo = reconciliation.memo;

        let mut outcome = Outcome::default();
        if let Some(snapshot) = reconciliation.snapshot {
            outcome.snapshot = Some(self.commit(snapshot));
        }
        if let Some(command) = reconciliation.command {
            let effect = match command {
                EngineCommand::Pause => Some(AckEffect::Confirm),
                EngineCommand::Play => Some(AckEffect::Settle(ProcessingState::Playing)),
                _ => None,
            };
            outcome.commands.push(self.issue(command, effect));
        }
        outcome
    }

    /// Apply an asynchronous engine report
    pub fn handle_engine_event(
        &mut self,
        event: &EngineEvent,
        now: DateTime<Utc>,
    ) -> Result<Outcome, InvariantViolation> {
        match event {
            EngineEvent::Acknowledged(id) => Ok(self.acknowledge(*id, now)),
            EngineEvent::Progress {
                position,
                buffered_position,
            } => {
                if self.snapshot.state.is_terminal() {
                    debug!(state = %self.snapshot.state, "Ignoring progress in terminal state");
                    return Ok(Outcome::default());
                }
                let candidate = PlaybackSnapshot {
                    position: *position,
                    buffered_position: *buffered_position,
                    update_time: now,
                    ..self.snapshot.clone()
                };
                Ok(Outcome {
                    snapshot: Some(self.commit(candidate)),
                    ..Outcome::default()
                })
            }
            EngineEvent::Status(status) => self.apply_status(*status, now),
            EngineEvent::Failed(failure) => {
                error!(code = failure.code, message = %failure.message, "Audio engine failed");
                Ok(self.enter_error(failure.code, failure.message.clone(), now))
            }
        }
    }

    /// Surface a missing transition as an error state
    pub fn fail_invariant(&mut self, violation: &InvariantViolation, now: DateTime<Utc>) -> Outcome {
        self.enter_error(INVARIANT_VIOLATION_CODE, violation.to_string(), now)
    }

    fn acknowledge(&mut self, id: CommandId, now: DateTime<Utc>) -> Outcome {
        let lane = self
            .pending
            .iter()
            .find(|(_, pending)| pending.id == id)
            .map(|(lane, _)| *lane);
        let Some(pending) = lane.and_then(|lane| self.pending.remove(&lane)) else {
            debug!(%id, "Discarding acknowledgement of superseded command");
            return Outcome::default();
        };

        let mut candidate = self.snapshot.clone();
        match pending.effect {
            AckEffect::Settle(state) => {
                candidate.state = state;
                candidate.paused_by_system = false;
            }
            AckEffect::Resume {
                position,
                queue_item_id,
            } => {
                candidate.state = self.resume_target;
                if let Some(position) = position {
                    candidate.position = position;
                }
                if queue_item_id.is_some() {
                    candidate.queue_item_id = queue_item_id;
                }
            }
            AckEffect::Confirm => return Outcome::default(),
            AckEffect::Stopped => {
                return Outcome {
                    stop_acknowledged: true,
                    ..Outcome::default()
                }
            }
            AckEffect::Rating(rating) => candidate.rating = Some(rating),
            AckEffect::RepeatMode(mode) => candidate.repeat_mode = mode,
            AckEffect::ShuffleMode(mode) => candidate.shuffle_mode = mode,
            AckEffect::Speed(speed) => candidate.speed = speed,
        }
        candidate.update_time = now;

        Outcome {
            snapshot: Some(self.commit(candidate)),
            ..Outcome::default()
        }
    }

    fn apply_status(
        &mut self,
        status: EngineStatus,
        now: DateTime<Utc>,
    ) -> Result<Outcome, InvariantViolation> {
        use ProcessingState as S;

        let state = self.snapshot.state;
        if state.is_terminal() {
            debug!(%state, ?status, "Ignoring engine status in terminal state");
            return Ok(Outcome::default());
        }

        let violation = || InvariantViolation::new(state, EngineEvent::Status(status).describe());

        match status {
            EngineStatus::Buffering => match state {
                S::Idle | S::Completed => Err(violation()),
                S::Buffering => Ok(Outcome::default()),
                _ => Ok(self.transition(S::Buffering, now)),
            },
            EngineStatus::Ready => match state {
                S::Idle => Err(violation()),
                S::Ready | S::Playing => Ok(Outcome::default()),
                S::Completed => Ok(self.transition(S::Ready, now)),
                _ => Ok(self.transition(self.resume_target, now)),
            },
            EngineStatus::Completed => match state {
                S::Idle | S::Loading | S::Buffering => Err(violation()),
                S::Completed => Ok(Outcome::default()),
                _ => Ok(self.complete(now)),
            },
        }
    }

    /// End of media, restarting or advancing according to the repeat mode
    fn complete(&mut self, now: DateTime<Utc>) -> Outcome {
        let mut outcome = Outcome::default();
        let mut candidate = self.snapshot.clone();
        candidate.update_time = now;

        match self.snapshot.repeat_mode {
            RepeatMode::One => {
                candidate.state = ProcessingState::Playing;
                candidate.position = Duration::ZERO;
                outcome.snapshot = Some(self.commit(candidate));
                outcome.commands.push(self.issue(
                    EngineCommand::SeekTo {
                        position: Duration::ZERO,
                    },
                    Some(AckEffect::Resume {
                        position: Some(Duration::ZERO),
                        queue_item_id: None,
                    }),
                ));
            }
            RepeatMode::All | RepeatMode::Group => {
                candidate.state = ProcessingState::SkippingToNext;
                outcome.snapshot = Some(self.commit(candidate));
                self.resume_target = ProcessingState::Playing;
                outcome
                    .commands
                    .push(self.issue(EngineCommand::SkipToNext, Some(AckEffect::resume())));
            }
            RepeatMode::None => {
                candidate.state = ProcessingState::Completed;
                outcome.snapshot = Some(self.commit(candidate));
            }
        }

        outcome
    }

    fn enter_error(&mut self, code: i32, message: String, now: DateTime<Utc>) -> Outcome {
        self.pending.clear();
        self.memo = None;

        let candidate = PlaybackSnapshot {
            state: ProcessingState::Error,
            paused_by_system: false,
            error_code: Some(code),
            error_message: Some(message),
            update_time: now,
            ..self.snapshot.clone()
        };

        Outcome {
            snapshot: Some(self.commit(candidate)),
            ..Outcome::default()
        }
    }

    fn transition(&mut self, state: ProcessingState, now: DateTime<Utc>) -> Outcome {
        let candidate = self.snapshot.with_state(state, now);
        Outcome {
            snapshot: Some(self.commit(candidate)),
            ..Outcome::default()
        }
    }

    /// Replace the current snapshot and track where transient states settle
    fn commit(&mut self, mut candidate: PlaybackSnapshot) -> PlaybackSnapshot {
        let from = self.snapshot.state;
        let to = candidate.state;

        // A system pause only exists while ready, and survives a buffering blip
        if to != ProcessingState::Ready {
            candidate.paused_by_system = false;
        } else if from.phase() == ProcessingPhase::Buffering && self.system_pause_holds() {
            candidate.paused_by_system = true;
        }

        match to {
            ProcessingState::Playing => self.resume_target = ProcessingState::Playing,
            ProcessingState::Idle
            | ProcessingState::Ready
            | ProcessingState::Stopped
            | ProcessingState::Error => self.resume_target = ProcessingState::Ready,
            _ => {}
        }

        if from != to {
            info!(%from, %to, "Playback state changed");
        }

        self.snapshot = candidate;
        self.snapshot.clone()
    }

    /// Where the in-flight transport command leaves playback
    fn transport_intent(&self) -> Option<TransportIntent> {
        match self.pending.get(&CommandLane::Transport)?.effect {
            AckEffect::Settle(ProcessingState::Playing) => Some(TransportIntent::Play),
            AckEffect::Settle(_) | AckEffect::Confirm => Some(TransportIntent::Pause),
            _ => None,
        }
    }

    /// An interruption paused playback and no user action has happened since
    fn system_pause_holds(&self) -> bool {
        self.memo
            .is_some_and(|memo| memo.action_seq == self.action_seq)
    }

    fn issue(&mut self, command: EngineCommand, effect: Option<AckEffect>) -> IssuedCommand {
        let id = CommandId::new(self.next_command_id);
        self.next_command_id += 1;

        if let (Some(lane), Some(effect)) = (command.lane(), effect) {
            if let Some(previous) = self.pending.insert(lane, PendingCommand { id, effect }) {
                debug!(superseded = %previous.id, by = %id, ?lane, "Command superseded");
            }
        }

        debug!(%id, command = command.name(), "Issuing engine command");
        IssuedCommand { id, command }
    }
}

/// Issue-time state and acknowledgement effect of a dispatched command
fn plan(command: &EngineCommand, current: ProcessingState) -> (Option<ProcessingState>, AckEffect) {
    use ProcessingState as S;

    match command {
        EngineCommand::Stop => (Some(S::Stopped), AckEffect::Stopped),
        EngineCommand::Pause => (None, AckEffect::Settle(S::Ready)),
        EngineCommand::Play => {
            let reload = matches!(current, S::Idle | S::Stopped | S::Error);
            (reload.then_some(S::Loading), AckEffect::Settle(S::Playing))
        }
        EngineCommand::PlayFromMediaId { .. }
        | EngineCommand::PlayFromSearch { .. }
        | EngineCommand::PlayFromUri { .. } => (Some(S::Loading), AckEffect::Settle(S::Playing)),
        EngineCommand::Prepare
        | EngineCommand::PrepareFromMediaId { .. }
        | EngineCommand::PrepareFromSearch { .. }
        | EngineCommand::PrepareFromUri { .. } => (Some(S::Loading), AckEffect::Settle(S::Ready)),
        EngineCommand::FastForward { .. } => (Some(S::FastForwarding), AckEffect::resume()),
        EngineCommand::Rewind { .. } => (Some(S::Rewinding), AckEffect::resume()),
        EngineCommand::SeekForward { begin } => {
            (begin.then_some(S::FastForwarding), AckEffect::resume())
        }
        EngineCommand::SeekBackward { begin } => {
            (begin.then_some(S::Rewinding), AckEffect::resume())
        }
        EngineCommand::SeekTo { position } => (
            None,
            AckEffect::Resume {
                position: Some(*position),
                queue_item_id: None,
            },
        ),
        EngineCommand::SkipToPrevious => (Some(S::SkippingToPrevious), AckEffect::resume()),
        EngineCommand::SkipToNext => (Some(S::SkippingToNext), AckEffect::resume()),
        EngineCommand::SkipToQueueItem { id } => (
            Some(S::SkippingToQueueItem),
            AckEffect::Resume {
                position: None,
                queue_item_id: Some(*id),
            },
        ),
        EngineCommand::SetRating { rating, .. } => (None, AckEffect::Rating(*rating)),
        EngineCommand::SetRepeatMode { mode } => (None, AckEffect::RepeatMode(*mode)),
        EngineCommand::SetShuffleMode { mode } => (None, AckEffect::ShuffleMode(*mode)),
        EngineCommand::SetSpeed { speed } => (None, AckEffect::Speed(*speed)),
        EngineCommand::Custom { .. }
        | EngineCommand::SetVolumeTo { .. }
        | EngineCommand::AdjustVolume { .. }
        | EngineCommand::Duck { .. }
        | EngineCommand::Unduck => (None, AckEffect::Confirm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::AnyQueueItem;
    use tempo_core::types::{Extras, MediaButton, VolumeAdjustment};
    use tempo_core::EngineError;

    // ===== Test Helpers =====

    fn machine_in(state: ProcessingState) -> PlaybackStateMachine {
        let initial = PlaybackSnapshot {
            state,
            ..PlaybackSnapshot::default()
        };
        PlaybackStateMachine::new(initial, DispatchPolicy::default(), 0.2)
    }

    fn act(machine: &mut PlaybackStateMachine, action: ActionKind) -> Outcome {
        machine
            .handle_action(&action, &AnyQueueItem, Utc::now())
            .unwrap()
    }

    fn event(machine: &mut PlaybackStateMachine, event: EngineEvent) -> Outcome {
        machine.handle_engine_event(&event, Utc::now()).unwrap()
    }

    fn ack(machine: &mut PlaybackStateMachine, outcome: &Outcome) -> Outcome {
        event(machine, EngineEvent::Acknowledged(outcome.commands[0].id))
    }

    fn state(machine: &PlaybackStateMachine) -> ProcessingState {
        machine.snapshot().state
    }

    // ===== Actions =====

    #[test]
    fn play_from_idle_loads_then_plays() {
        let mut machine = machine_in(ProcessingState::Idle);

        let issued = act(&mut machine, ActionKind::Play);
        assert_eq!(issued.snapshot.as_ref().unwrap().state, ProcessingState::Loading);
        assert_eq!(issued.commands[0].command, EngineCommand::Play);

        let acked = ack(&mut machine, &issued);
        assert_eq!(acked.snapshot.unwrap().state, ProcessingState::Playing);
        assert_eq!(machine.resume_target(), ProcessingState::Playing);
    }

    #[test]
    fn pause_commits_on_acknowledgement() {
        let mut machine = machine_in(ProcessingState::Playing);

        let issued = act(&mut machine, ActionKind::Pause);
        assert!(issued.snapshot.is_none());
        assert_eq!(state(&machine), ProcessingState::Playing);

        ack(&mut machine, &issued);
        assert_eq!(state(&machine), ProcessingState::Ready);
    }

    #[test]
    fn pause_before_play_is_acknowledged() {
        let mut machine = machine_in(ProcessingState::Ready);
        let play = act(&mut machine, ActionKind::Play);
        assert_eq!(state(&machine), ProcessingState::Ready);

        let pause = act(&mut machine, ActionKind::Pause);
        assert_eq!(pause.commands[0].command, EngineCommand::Pause);

        assert!(ack(&mut machine, &play).is_empty());
        ack(&mut machine, &pause);
        assert_eq!(state(&machine), ProcessingState::Ready);
    }

    #[test]
    fn toggle_during_pending_play_pauses() {
        let mut machine = machine_in(ProcessingState::Ready);
        let play = act(&mut machine, ActionKind::Play);

        let toggle = act(&mut machine, ActionKind::PlayPause);
        assert_eq!(toggle.commands[0].command, EngineCommand::Pause);

        // The toggle supersedes the play, so it is the one that settles
        assert!(ack(&mut machine, &play).is_empty());
        ack(&mut machine, &toggle);
        assert_eq!(state(&machine), ProcessingState::Ready);
    }

    #[test]
    fn media_button_clicks_drive_transport() {
        let mut machine = machine_in(ProcessingState::Playing);

        let next = act(
            &mut machine,
            ActionKind::Click {
                button: MediaButton::Next,
            },
        );
        assert_eq!(next.commands[0].command, EngineCommand::SkipToNext);
        assert_eq!(state(&machine), ProcessingState::SkippingToNext);
        ack(&mut machine, &next);
        assert_eq!(state(&machine), ProcessingState::Playing);

        let media = act(
            &mut machine,
            ActionKind::Click {
                button: MediaButton::Media,
            },
        );
        assert_eq!(media.commands[0].command, EngineCommand::Pause);
    }

    #[test]
    fn volume_changes_are_not_tracked() {
        let mut machine = machine_in(ProcessingState::Playing);
        let raise = act(
            &mut machine,
            ActionKind::AdjustVolume {
                adjustment: VolumeAdjustment::Raise,
            },
        );

        assert!(raise.snapshot.is_none());
        assert_eq!(
            raise.commands[0].command,
            EngineCommand::AdjustVolume {
                adjustment: VolumeAdjustment::Raise
            }
        );
        assert_eq!(machine.pending_command(CommandLane::Transport), None);
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn play_acknowledged_without_interference() {
        let mut machine = machine_in(ProcessingState::Ready);
        let play = act(&mut machine, ActionKind::Play);
        assert_eq!(
            machine.pending_command(CommandLane::Transport),
            Some(play.commands[0].id)
        );
        ack(&mut machine, &play);
        assert_eq!(state(&machine), ProcessingState::Playing);
        assert_eq!(machine.pending_command(CommandLane::Transport), None);
    }

    #[test]
    fn stop_twice_has_no_second_effect() {
        let mut machine = machine_in(ProcessingState::Playing);

        let first = act(&mut machine, ActionKind::Stop);
        assert_eq!(first.snapshot.unwrap().state, ProcessingState::Stopped);
        assert_eq!(first.commands.len(), 1);

        let second = act(&mut machine, ActionKind::Stop);
        assert!(second.is_empty());
        assert_eq!(state(&machine), ProcessingState::Stopped);
    }

    #[test]
    fn stop_acknowledgement_is_reported() {
        let mut machine = machine_in(ProcessingState::Playing);
        let issued = act(&mut machine, ActionKind::Stop);
        let acked = ack(&mut machine, &issued);
        assert!(acked.stop_acknowledged);
        assert!(acked.snapshot.is_none());
    }

    #[test]
    fn rejected_action_leaves_snapshot_untouched() {
        let mut machine = machine_in(ProcessingState::Playing);
        let before = machine.snapshot().clone();

        let result = machine.handle_action(
            &ActionKind::SetSpeed { speed: -1.0 },
            &AnyQueueItem,
            Utc::now(),
        );
        assert!(matches!(result, Err(ValidationError::InvalidArgument(_))));
        assert_eq!(machine.snapshot(), &before);
        assert_eq!(machine.action_seq(), 0);
    }

    #[test]
    fn seek_returns_to_playing_with_new_position() {
        let mut machine = machine_in(ProcessingState::Playing);
        let issued = act(
            &mut machine,
            ActionKind::SeekTo {
                position: Duration::from_secs(42),
            },
        );
        ack(&mut machine, &issued);

        assert_eq!(state(&machine), ProcessingState::Playing);
        assert_eq!(machine.snapshot().position, Duration::from_secs(42));
    }

    #[test]
    fn fast_forward_from_ready_settles_in_ready() {
        let mut machine = machine_in(ProcessingState::Ready);
        let issued = act(&mut machine, ActionKind::FastForward);
        assert_eq!(state(&machine), ProcessingState::FastForwarding);

        ack(&mut machine, &issued);
        assert_eq!(state(&machine), ProcessingState::Ready);
    }

    #[test]
    fn continuous_seek_ends_on_release() {
        let mut machine = machine_in(ProcessingState::Playing);

        act(&mut machine, ActionKind::SeekForward { begin: true });
        assert_eq!(state(&machine), ProcessingState::FastForwarding);

        let released = act(&mut machine, ActionKind::SeekForward { begin: false });
        assert!(released.snapshot.is_none());

        ack(&mut machine, &released);
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn skip_to_queue_item_records_item() {
        let mut machine = machine_in(ProcessingState::Playing);
        let issued = act(
            &mut machine,
            ActionKind::SkipToQueueItem {
                id: QueueItemId::new(9),
            },
        );
        assert_eq!(state(&machine), ProcessingState::SkippingToQueueItem);

        ack(&mut machine, &issued);
        assert_eq!(state(&machine), ProcessingState::Playing);
        assert_eq!(machine.snapshot().queue_item_id, Some(QueueItemId::new(9)));
    }

    #[test]
    fn settings_apply_on_acknowledgement() {
        let mut machine = machine_in(ProcessingState::Playing);

        let speed = act(&mut machine, ActionKind::SetSpeed { speed: 1.5 });
        assert!(speed.snapshot.is_none());
        let repeat = act(
            &mut machine,
            ActionKind::SetRepeatMode {
                mode: RepeatMode::All,
            },
        );

        ack(&mut machine, &repeat);
        ack(&mut machine, &speed);

        assert_eq!(machine.snapshot().speed, 1.5);
        assert_eq!(machine.snapshot().repeat_mode, RepeatMode::All);
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn superseded_acknowledgement_is_discarded() {
        let mut machine = machine_in(ProcessingState::Ready);

        let first = act(&mut machine, ActionKind::Play);
        let second = act(&mut machine, ActionKind::SkipToNext);
        assert_eq!(
            machine.pending_command(CommandLane::Transport),
            Some(second.commands[0].id)
        );

        let stale = ack(&mut machine, &first);
        assert!(stale.is_empty());
        assert_eq!(state(&machine), ProcessingState::SkippingToNext);
    }

    #[test]
    fn settings_do_not_supersede_transport() {
        let mut machine = machine_in(ProcessingState::Ready);

        let play = act(&mut machine, ActionKind::Play);
        act(&mut machine, ActionKind::SetSpeed { speed: 2.0 });

        ack(&mut machine, &play);
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn play_from_error_clears_error_fields() {
        let mut machine = machine_in(ProcessingState::Playing);
        event(
            &mut machine,
            EngineEvent::Failed(EngineError::new(4, "network")),
        );
        assert_eq!(machine.snapshot().error_code, Some(4));

        let outcome = act(
            &mut machine,
            ActionKind::PlayFromMediaId {
                media_id: tempo_core::types::MediaId::new("track-2"),
                extras: Extras::new(),
            },
        );
        let snapshot = outcome.snapshot.unwrap();
        assert_eq!(snapshot.state, ProcessingState::Loading);
        assert_eq!(snapshot.error_code, None);
        assert_eq!(snapshot.error_message, None);
    }

    // ===== Engine events =====

    #[test]
    fn failure_is_reachable_from_every_state() {
        for initial in ProcessingState::ALL {
            let mut machine = machine_in(initial);
            let outcome = event(
                &mut machine,
                EngineEvent::Failed(EngineError::new(2, "decoder")),
            );
            let snapshot = outcome.snapshot.unwrap();
            assert_eq!(snapshot.state, ProcessingState::Error);
            assert_eq!(snapshot.error_code, Some(2));
        }
    }

    #[test]
    fn failure_clears_pending_commands() {
        let mut machine = machine_in(ProcessingState::Ready);
        let play = act(&mut machine, ActionKind::Play);

        event(
            &mut machine,
            EngineEvent::Failed(EngineError::new(1, "gone")),
        );
        assert_eq!(machine.pending_command(CommandLane::Transport), None);

        assert!(ack(&mut machine, &play).is_empty());
        assert_eq!(state(&machine), ProcessingState::Error);
    }

    #[test]
    fn terminal_states_ignore_autonomous_progress() {
        for initial in [ProcessingState::Stopped, ProcessingState::Error] {
            let mut machine = machine_in(initial);
            for status in [
                EngineStatus::Buffering,
                EngineStatus::Ready,
                EngineStatus::Completed,
            ] {
                assert!(event(&mut machine, EngineEvent::Status(status)).is_empty());
            }
            let progress = event(
                &mut machine,
                EngineEvent::Progress {
                    position: Duration::from_secs(1),
                    buffered_position: Duration::from_secs(2),
                },
            );
            assert!(progress.is_empty());
            assert_eq!(state(&machine), initial);
        }
    }

    #[test]
    fn buffering_returns_to_playing() {
        let mut machine = machine_in(ProcessingState::Playing);
        event(&mut machine, EngineEvent::Status(EngineStatus::Buffering));
        assert_eq!(state(&machine), ProcessingState::Buffering);

        event(&mut machine, EngineEvent::Status(EngineStatus::Ready));
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn undefined_status_edges_are_violations() {
        let mut machine = machine_in(ProcessingState::Idle);
        let violation = machine
            .handle_engine_event(&EngineEvent::Status(EngineStatus::Completed), Utc::now())
            .unwrap_err();
        assert_eq!(violation.state, ProcessingState::Idle);

        let outcome = machine.fail_invariant(&violation, Utc::now());
        let snapshot = outcome.snapshot.unwrap();
        assert_eq!(snapshot.state, ProcessingState::Error);
        assert_eq!(snapshot.error_code, Some(INVARIANT_VIOLATION_CODE));
    }

    #[test]
    fn completion_without_repeat_commits_completed() {
        let mut machine = machine_in(ProcessingState::Playing);
        let outcome = event(&mut machine, EngineEvent::Status(EngineStatus::Completed));
        assert_eq!(outcome.snapshot.unwrap().state, ProcessingState::Completed);
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn repeat_one_restarts_from_zero() {
        let mut machine = machine_in(ProcessingState::Playing);
        let set = act(
            &mut machine,
            ActionKind::SetRepeatMode {
                mode: RepeatMode::One,
            },
        );
        ack(&mut machine, &set);

        let outcome = event(&mut machine, EngineEvent::Status(EngineStatus::Completed));
        assert_eq!(
            outcome.commands[0].command,
            EngineCommand::SeekTo {
                position: Duration::ZERO
            }
        );
        assert_eq!(state(&machine), ProcessingState::Playing);
        assert_eq!(machine.snapshot().position, Duration::ZERO);
    }

    #[test]
    fn repeat_all_advances_to_next_item() {
        let mut machine = machine_in(ProcessingState::Playing);
        let set = act(
            &mut machine,
            ActionKind::SetRepeatMode {
                mode: RepeatMode::All,
            },
        );
        ack(&mut machine, &set);

        let outcome = event(&mut machine, EngineEvent::Status(EngineStatus::Completed));
        assert_eq!(outcome.commands[0].command, EngineCommand::SkipToNext);
        assert_eq!(state(&machine), ProcessingState::SkippingToNext);

        ack(&mut machine, &outcome);
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn progress_updates_positions() {
        let mut machine = machine_in(ProcessingState::Playing);
        let outcome = event(
            &mut machine,
            EngineEvent::Progress {
                position: Duration::from_secs(3),
                buffered_position: Duration::from_secs(8),
            },
        );
        let snapshot = outcome.snapshot.unwrap();
        assert_eq!(snapshot.position, Duration::from_secs(3));
        assert_eq!(snapshot.buffered_position, Duration::from_secs(8));
    }

    // ===== Interruptions =====

    #[test]
    fn temporary_pause_resumes_without_user_action() {
        let mut machine = machine_in(ProcessingState::Playing);

        let began = machine.handle_interruption(
            InterruptionKind::TemporaryPause,
            InterruptionPhase::Began,
            Utc::now(),
        );
        assert_eq!(began.commands[0].command, EngineCommand::Pause);
        assert!(machine.snapshot().paused_by_system);

        let ended = machine.handle_interruption(
            InterruptionKind::TemporaryPause,
            InterruptionPhase::Ended,
            Utc::now(),
        );
        assert_eq!(ended.commands[0].command, EngineCommand::Play);

        ack(&mut machine, &ended);
        assert_eq!(state(&machine), ProcessingState::Playing);
        assert!(!machine.snapshot().paused_by_system);
    }

    #[test]
    fn buffering_during_interruption_keeps_resume() {
        let mut machine = machine_in(ProcessingState::Playing);
        machine.handle_interruption(
            InterruptionKind::TemporaryPause,
            InterruptionPhase::Began,
            Utc::now(),
        );

        event(&mut machine, EngineEvent::Status(EngineStatus::Buffering));
        assert_eq!(state(&machine), ProcessingState::Buffering);
        assert!(!machine.snapshot().paused_by_system);

        event(&mut machine, EngineEvent::Status(EngineStatus::Ready));
        assert_eq!(state(&machine), ProcessingState::Ready);
        assert!(machine.snapshot().paused_by_system);

        let ended = machine.handle_interruption(
            InterruptionKind::TemporaryPause,
            InterruptionPhase::Ended,
            Utc::now(),
        );
        assert_eq!(ended.commands[0].command, EngineCommand::Play);
        ack(&mut machine, &ended);
        assert_eq!(state(&machine), ProcessingState::Playing);
    }

    #[test]
    fn user_pause_during_interruption_prevents_resume() {
        let mut machine = machine_in(ProcessingState::Playing);

        machine.handle_interruption(
            InterruptionKind::TemporaryPause,
            InterruptionPhase::Began,
            Utc::now(),
        );
        let pause = act(&mut machine, ActionKind::Pause);
        ack(&mut machine, &pause);

        let ended = machine.handle_interruption(
            InterruptionKind::TemporaryPause,
            InterruptionPhase::Ended,
            Utc::now(),
        );
        assert!(ended.commands.is_empty());
        assert_eq!(state(&machine), ProcessingState::Ready);
    }

    #[test]
    fn system_pause_supersedes_in_flight_play() {
        let mut machine = machine_in(ProcessingState::Idle);
        let play = act(&mut machine, ActionKind::Play);
        assert_eq!(state(&machine), ProcessingState::Loading);

        machine.handle_interruption(InterruptionKind::Pause, InterruptionPhase::Began, Utc::now());
        assert!(ack(&mut machine, &play).is_empty());
        assert_eq!(state(&machine), ProcessingState::Ready);
    }

    #[test]
    fn duck_keeps_state_and_is_fire_and_forget() {
        let mut machine = machine_in(ProcessingState::Playing);
        let outcome = machine.handle_interruption(
            InterruptionKind::TemporaryDuck,
            InterruptionPhase::Began,
            Utc::now(),
        );
        assert_eq!(state(&machine), ProcessingState::Playing);
        assert!(machine.snapshot().ducked);
        assert_eq!(
            outcome.commands[0].command,
            EngineCommand::Duck { gain: 0.2 }
        );
        assert_eq!(machine.pending_command(CommandLane::Transport), None);
    }
}
