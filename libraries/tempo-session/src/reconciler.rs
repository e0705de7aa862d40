//! Interruption reconciliation
//!
//! Turns platform interruptions into snapshot changes and engine commands.
//! A temporary pause remembers the action counter at the moment it began;
//! playback only resumes when it ends if no user action was accepted in
//! between.

use crate::command::EngineCommand;
use chrono::{DateTime, Utc};
use tempo_core::types::{InterruptionKind, InterruptionPhase, PlaybackSnapshot, ProcessingState};

/// What the reconciler remembers about the interruption in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptionMemo {
    pub kind: InterruptionKind,

    /// Playback should come back when the interruption ends
    pub resume_eligible: bool,

    /// Accepted-action counter when the interruption began
    pub action_seq: u64,
}

/// Result of reconciling one interruption
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Snapshot to commit, `None` when nothing changed
    pub snapshot: Option<PlaybackSnapshot>,
    pub command: Option<EngineCommand>,
    pub memo: Option<InterruptionMemo>,
}

impl Reconciliation {
    fn unchanged(memo: Option<InterruptionMemo>) -> Self {
        Self {
            snapshot: None,
            command: None,
            memo,
        }
    }
}

/// Reconcile an interruption with the current snapshot
pub fn reconcile(
    snapshot: &PlaybackSnapshot,
    memo: Option<InterruptionMemo>,
    action_seq: u64,
    kind: InterruptionKind,
    phase: InterruptionPhase,
    duck_gain: f32,
    now: DateTime<Utc>,
) -> Reconciliation {
    match (kind, phase) {
        (InterruptionKind::TemporaryDuck, InterruptionPhase::Began) => {
            if snapshot.ducked {
                return Reconciliation::unchanged(memo);
            }
            Reconciliation {
                snapshot: Some(PlaybackSnapshot {
                    ducked: true,
                    update_time: now,
                    ..snapshot.clone()
                }),
                command: Some(EngineCommand::Duck { gain: duck_gain }),
                memo,
            }
        }
        (InterruptionKind::TemporaryDuck, InterruptionPhase::Ended) => {
            if !snapshot.ducked {
                return Reconciliation::unchanged(memo);
            }
            Reconciliation {
                snapshot: Some(PlaybackSnapshot {
                    ducked: false,
                    update_time: now,
                    ..snapshot.clone()
                }),
                command: Some(EngineCommand::Unduck),
                memo,
            }
        }
        (kind, InterruptionPhase::Began) => begin_pause(snapshot, memo, action_seq, kind, now),
        (InterruptionKind::TemporaryPause, InterruptionPhase::Ended) => {
            end_temporary_pause(snapshot, memo, action_seq, now)
        }
        // Permanent pauses never resume on their own
        (_, InterruptionPhase::Ended) => Reconciliation::unchanged(None),
    }
}

fn begin_pause(
    snapshot: &PlaybackSnapshot,
    memo: Option<InterruptionMemo>,
    action_seq: u64,
    kind: InterruptionKind,
    now: DateTime<Utc>,
) -> Reconciliation {
    if !snapshot.state.is_active() {
        // A repeated temporary pause keeps the resume promise of the first one
        let memo = match memo {
            Some(existing)
                if kind == InterruptionKind::TemporaryPause && existing.resume_eligible =>
            {
                existing
            }
            _ => InterruptionMemo {
                kind,
                resume_eligible: false,
                action_seq,
            },
        };
        return Reconciliation::unchanged(Some(memo));
    }

    let resume_eligible =
        kind == InterruptionKind::TemporaryPause && snapshot.state == ProcessingState::Playing;

    Reconciliation {
        snapshot: Some(PlaybackSnapshot {
            state: ProcessingState::Ready,
            paused_by_system: true,
            update_time: now,
            ..snapshot.clone()
        }),
        command: Some(EngineCommand::Pause),
        memo: Some(InterruptionMemo {
            kind,
            resume_eligible,
            action_seq,
        }),
    }
}

fn end_temporary_pause(
    snapshot: &PlaybackSnapshot,
    memo: Option<InterruptionMemo>,
    action_seq: u64,
    now: DateTime<Utc>,
) -> Reconciliation {
    let eligible = memo.is_some_and(|memo| {
        memo.kind == InterruptionKind::TemporaryPause
            && memo.resume_eligible
            && memo.action_seq == action_seq
    });
    // The engine may still be buffering when the interruption ends
    let resumable = match snapshot.state {
        ProcessingState::Ready => snapshot.paused_by_system,
        ProcessingState::Loading | ProcessingState::Buffering => true,
        _ => false,
    };
    let should_resume = eligible && resumable;

    if !should_resume {
        return Reconciliation::unchanged(None);
    }

    Reconciliation {
        snapshot: Some(PlaybackSnapshot {
            paused_by_system: false,
            update_time: now,
            ..snapshot.clone()
        }),
        command: Some(EngineCommand::Play),
        memo: None,
    }
}
