//! Queue membership predicate
//!
//! The queue itself lives outside the core; dispatch only needs to know
//! whether a requested item exists.

use std::collections::HashSet;
use tempo_core::types::QueueItemId;

/// Answers whether an item is part of the current queue
pub trait QueueMembership: Send + Sync {
    fn contains(&self, id: &QueueItemId) -> bool;
}

impl<F> QueueMembership for F
where
    F: Fn(&QueueItemId) -> bool + Send + Sync,
{
    fn contains(&self, id: &QueueItemId) -> bool {
        self(id)
    }
}

impl QueueMembership for HashSet<QueueItemId> {
    fn contains(&self, id: &QueueItemId) -> bool {
        HashSet::contains(self, id)
    }
}

/// Membership used when no queue owner is attached: every item is accepted
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyQueueItem;

impl QueueMembership for AnyQueueItem {
    fn contains(&self, _id: &QueueItemId) -> bool {
        true
    }
}
