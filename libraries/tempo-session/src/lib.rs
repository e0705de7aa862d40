//! Tempo Session
//!
//! Playback state machine and command dispatch for the Tempo bridge.
//!
//! This crate provides:
//! - Action dispatch with per-state legality and payload validation
//! - Interruption reconciliation (pause, temporary pause, ducking)
//! - The playback state machine with issue-time and acknowledgement-time
//!   transitions
//! - A single-task session actor publishing snapshots to any number of
//!   subscribers
//!
//! # Architecture
//!
//! `tempo-session` never talks to audio hardware. The platform provides an
//! [`AudioEngine`] that executes commands and reports back through an
//! [`EngineEventSink`], and optionally a [`QueueMembership`] predicate.
//!
//! # Example
//!
//! ```rust,no_run
//! use tempo_session::{AudioEngine, IssuedCommand, SessionBuilder, SessionConfig};
//! use tempo_core::types::ActionKind;
//!
//! struct LoggingEngine;
//!
//! impl AudioEngine for LoggingEngine {
//!     fn issue(&mut self, command: IssuedCommand) {
//!         println!("engine <- {:?}", command.command);
//!     }
//! }
//!
//! # async fn run() -> tempo_core::Result<()> {
//! let session = SessionBuilder::new(SessionConfig::default()).spawn(LoggingEngine)?;
//! session.dispatch_action(ActionKind::Play).await?;
//! println!("{:?}", session.current_snapshot().state);
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod machine;
pub mod queue;
pub mod reconciler;
pub mod session;

pub use command::{CommandId, CommandLane, EngineCommand, IssuedCommand};
pub use config::SessionConfig;
pub use dispatcher::{dispatch, DispatchContext, DispatchPolicy, TransportIntent};
pub use engine::{AudioEngine, EngineEvent, EngineEventSink, EngineStatus};
pub use machine::{Outcome, PlaybackStateMachine};
pub use queue::{AnyQueueItem, QueueMembership};
pub use reconciler::{reconcile, InterruptionMemo, Reconciliation};
pub use session::{SessionBuilder, SessionHandle, SessionId, SnapshotStream};
