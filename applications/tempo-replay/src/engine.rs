//! Simulated audio engine

use std::time::Duration;
use tempo_session::{AudioEngine, EngineEventSink, IssuedCommand};

/// Engine that acknowledges every command after a fixed delay
///
/// Acknowledgements run on their own tasks, so a later command may be
/// acknowledged while an earlier one is still pending.
pub struct SimulatedEngine {
    events: EngineEventSink,
    ack_delay: Duration,
}

impl SimulatedEngine {
    pub fn new(events: EngineEventSink, ack_delay: Duration) -> Self {
        Self { events, ack_delay }
    }
}

impl AudioEngine for SimulatedEngine {
    fn issue(&mut self, command: IssuedCommand) {
        tracing::debug!(id = %command.id, command = command.command.name(), "Engine received command");

        let events = self.events.clone();
        let delay = self.ack_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.acknowledge(command.id).is_err() {
                tracing::debug!(id = %command.id, "Session closed before acknowledgement");
            }
        });
    }
}
