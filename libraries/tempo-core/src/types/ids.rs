/// ID types for media and queue entries
use serde::{Deserialize, Serialize};
use std::fmt;

/// Media item identifier, opaque to the core
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    /// Create a new media ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is blank
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Queue item identifier assigned by the queue owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueItemId(u64);

impl QueueItemId {
    /// Create a new queue item ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueueItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_id_from_string() {
        let id = MediaId::new("track-123");
        assert_eq!(id.as_str(), "track-123");
        assert!(!id.is_empty());
        assert!(MediaId::new("  ").is_empty());
    }

    #[test]
    fn queue_item_id_display() {
        assert_eq!(format!("{}", QueueItemId::new(7)), "7");
    }

    #[test]
    fn ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&MediaId::new("a")).unwrap(), "\"a\"");
        assert_eq!(serde_json::to_string(&QueueItemId::new(3)).unwrap(), "3");
    }
}
