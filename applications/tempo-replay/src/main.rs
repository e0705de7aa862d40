/// Tempo Replay - drive a playback session from a scripted event log
mod engine;
mod script;

use anyhow::Context;
use clap::Parser;
use engine::SimulatedEngine;
use script::ScriptLine;
use std::path::PathBuf;
use std::time::Duration;
use tempo_core::wire::snapshot_to_json;
use tempo_core::{BridgeError, SessionError};
use tempo_session::{SessionBuilder, SessionConfig, SessionHandle};
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tempo-replay")]
#[command(about = "Replay a JSON-lines event script against a simulated audio engine", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Delay before the simulated engine acknowledges a command
    #[arg(long, default_value_t = 50)]
    ack_delay_ms: u64,

    /// Script to replay, one event per line
    script: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only snapshots
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempo_replay=info,tempo_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config =
        SessionConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let lines = script::load(&cli.script)?;
    tracing::info!(script = %cli.script.display(), events = lines.len(), "Loaded replay script");

    let ack_delay = Duration::from_millis(cli.ack_delay_ms);
    let builder = SessionBuilder::new(config);
    let engine = SimulatedEngine::new(builder.engine_events(), ack_delay);
    let session = builder.spawn(engine)?;

    let mut snapshots = session.subscribe_snapshots();
    let printer = tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            match snapshot_to_json(&snapshot) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to encode snapshot: {}", e),
            }
        }
    });

    let rejected = replay(&session, lines).await?;

    // Let outstanding acknowledgements land before closing
    tokio::time::sleep(ack_delay * 2).await;
    session.shutdown().await;
    printer.await.context("snapshot printer panicked")?;

    tracing::info!(rejected, "Replay finished");
    Ok(())
}

/// Feed every script line to the session, returning the number of rejected actions
///
/// Replay ends early once the session has ended, e.g. after an acknowledged stop.
async fn replay(session: &SessionHandle, lines: Vec<ScriptLine>) -> anyhow::Result<usize> {
    let mut rejected = 0;

    for (index, line) in lines.into_iter().enumerate() {
        let delivered = match line {
            ScriptLine::Action(action) => {
                let tag = action.tag();
                match session.dispatch_action(action).await {
                    Ok(()) => Ok(()),
                    Err(BridgeError::Validation(reason)) => {
                        rejected += 1;
                        eprintln!("event {}: {tag} rejected: {reason}", index + 1);
                        Ok(())
                    }
                    Err(BridgeError::Session(e)) => Err(e),
                    Err(e) => return Err(e.into()),
                }
            }
            ScriptLine::Interruption { kind, phase } => session.submit_interruption(kind, phase),
            ScriptLine::Engine(event) => session.submit_engine_event(event),
            ScriptLine::WaitMs(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
        };

        if let Err(SessionError::Closed) = delivered {
            tracing::info!(event = index + 1, "Session ended, skipping remaining events");
            break;
        }
        delivered?;
    }

    Ok(rejected)
}
