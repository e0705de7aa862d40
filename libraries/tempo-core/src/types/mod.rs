mod action;
mod controls;
mod ids;
mod interruption;
mod modes;
mod processing_state;
mod rating;
mod snapshot;

pub use action::{ActionCategory, ActionKind, ActionTag, Extras};
pub use controls::{MediaButton, VolumeAdjustment};
pub use ids::{MediaId, QueueItemId};
pub use interruption::{InterruptionKind, InterruptionPhase};
pub use modes::{RepeatMode, ShuffleMode};
pub use processing_state::{ProcessingPhase, ProcessingState};
pub use rating::{Rating, RatingStyle};
pub use snapshot::PlaybackSnapshot;
