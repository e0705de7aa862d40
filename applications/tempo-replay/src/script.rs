//! JSON-lines replay scripts
//!
//! One inbound event per line. Blank lines and lines starting with `#` are
//! skipped so scripts can carry notes.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tempo_core::types::{ActionKind, InterruptionKind, InterruptionPhase};
use tempo_session::EngineEvent;

/// A single scripted input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ScriptLine {
    /// User or media-controller action
    Action(ActionKind),

    /// Platform audio-session interruption
    Interruption {
        kind: InterruptionKind,
        phase: InterruptionPhase,
    },

    /// Event injected as if the engine had reported it
    Engine(EngineEvent),

    /// Pause the script, letting the simulated engine catch up
    WaitMs(u64),
}

/// Parse a whole script, reporting the offending line number on error
pub fn parse(source: &str) -> anyhow::Result<Vec<ScriptLine>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: {line}", index + 1))
        })
        .collect()
}

pub fn load(path: &Path) -> anyhow::Result<Vec<ScriptLine>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempo_session::{CommandId, EngineStatus};

    #[test]
    fn test_parse_every_line_kind() {
        let script = r#"
# start playing
{"action":{"action":"play"}}
{"action":{"action":"seekTo","args":{"position":1500}}}
{"interruption":{"kind":"temporaryPause","phase":"began"}}
{"engine":{"status":"completed"}}
{"engine":{"acknowledged":3}}
{"wait_ms":250}
"#;
        let lines = parse(script).unwrap();

        assert_eq!(
            lines,
            vec![
                ScriptLine::Action(ActionKind::Play),
                ScriptLine::Action(ActionKind::SeekTo {
                    position: Duration::from_millis(1500)
                }),
                ScriptLine::Interruption {
                    kind: InterruptionKind::TemporaryPause,
                    phase: InterruptionPhase::Began,
                },
                ScriptLine::Engine(EngineEvent::Status(EngineStatus::Completed)),
                ScriptLine::Engine(EngineEvent::Acknowledged(CommandId::new(3))),
                ScriptLine::WaitMs(250),
            ]
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let script = "{\"action\":{\"action\":\"play\"}}\n{\"bogus\":1}\n";
        let err = parse(script).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/script.jsonl")).unwrap_err();
        assert!(err.to_string().contains("failed to read script"));
    }
}
