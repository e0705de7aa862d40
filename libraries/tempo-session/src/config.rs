/// Session configuration
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tempo_core::SessionError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Jump applied by `fastForward`
    #[serde(default = "default_fast_forward_interval_ms")]
    pub fast_forward_interval_ms: u64,

    /// Jump applied by `rewind`
    #[serde(default = "default_rewind_interval_ms")]
    pub rewind_interval_ms: u64,

    /// Volume multiplier while ducked, in `(0, 1]`
    #[serde(default = "default_duck_gain")]
    pub duck_gain: f32,

    /// Snapshots buffered per subscriber before it starts lagging
    #[serde(default = "default_snapshot_buffer")]
    pub snapshot_buffer: usize,

    /// End the session once the engine acknowledges `stop`. Disable to keep
    /// one session across stop and a later `play*` or `prepare*`.
    #[serde(default = "default_end_session_on_stop")]
    pub end_session_on_stop: bool,
}

impl SessionConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables use the `TEMPO_` prefix, e.g.
    /// `TEMPO_DUCK_GAIN=0.5`.
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        // Override with environment variables (prefixed with TEMPO_)
        settings = settings.add_source(
            config::Environment::with_prefix("TEMPO")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| SessionError::config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.fast_forward_interval_ms == 0 {
            return Err(SessionError::config(
                "fast_forward_interval_ms must be greater than zero",
            ));
        }

        if self.rewind_interval_ms == 0 {
            return Err(SessionError::config(
                "rewind_interval_ms must be greater than zero",
            ));
        }

        if !(self.duck_gain > 0.0 && self.duck_gain <= 1.0) {
            return Err(SessionError::config(format!(
                "duck_gain must be in (0, 1], got {}",
                self.duck_gain
            )));
        }

        if self.snapshot_buffer == 0 {
            return Err(SessionError::config("snapshot_buffer must be at least 1"));
        }

        Ok(())
    }

    pub fn fast_forward_interval(&self) -> Duration {
        Duration::from_millis(self.fast_forward_interval_ms)
    }

    pub fn rewind_interval(&self) -> Duration {
        Duration::from_millis(self.rewind_interval_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fast_forward_interval_ms: default_fast_forward_interval_ms(),
            rewind_interval_ms: default_rewind_interval_ms(),
            duck_gain: default_duck_gain(),
            snapshot_buffer: default_snapshot_buffer(),
            end_session_on_stop: default_end_session_on_stop(),
        }
    }
}

// Default values
fn default_fast_forward_interval_ms() -> u64 {
    10_000
}

fn default_rewind_interval_ms() -> u64 {
    10_000
}

fn default_duck_gain() -> f32 {
    0.2
}

fn default_snapshot_buffer() -> usize {
    64
}

fn default_end_session_on_stop() -> bool {
    true
}
