//! Preview lock - bounded unauthenticated preview before prompting for access

use std::time::Duration;

use latch_core::{FeatureId, Timestamp};

/// Per-session preview window for the currently viewed item
///
/// Independent of the grant mechanism: a purely local timer that resets
/// whenever the viewed item changes, and is never persisted.
#[derive(Clone, Debug)]
pub struct PreviewLock {
    limit: Duration,
    item: Option<FeatureId>,
    started_at: Timestamp,
}

impl PreviewLock {
    pub fn new(limit: Duration) -> Self {
        PreviewLock {
            limit,
            item: None,
            started_at: Timestamp::ZERO,
        }
    }

    /// Begin (or continue) previewing an item
    ///
    /// Switching to a different item restarts the window; re-reporting the
    /// same item leaves it running.
    pub fn start(&mut self, item: FeatureId, now: Timestamp) {
        if self.item.as_ref() != Some(&item) {
            self.item = Some(item);
            self.started_at = now;
        }
    }

    /// Preview time left for the current item
    pub fn remaining(&self, now: Timestamp) -> Duration {
        if self.item.is_none() {
            return self.limit;
        }
        let elapsed = now - self.started_at;
        self.limit.saturating_sub(elapsed)
    }

    /// Whether the preview window is used up - time to prompt for access
    pub fn expired(&self, now: Timestamp) -> bool {
        self.item.is_some() && self.remaining(now).is_zero()
    }

    pub fn item(&self) -> Option<&FeatureId> {
        self.item.as_ref()
    }
}
