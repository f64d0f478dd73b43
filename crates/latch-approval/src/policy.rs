//! Approval policy - admin-mutable configuration injected into the engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use latch_core::TierTable;

/// Process-wide approval behavior
///
/// Read before every intake, written on admin toggles. Lives behind an
/// `Arc` shared by the engine and the admin surface.
pub struct ApprovalPolicy {
    auto_approve: AtomicBool,
    tiers: RwLock<TierTable>,
}

impl ApprovalPolicy {
    pub fn new(auto_approve: bool, tiers: TierTable) -> Self {
        ApprovalPolicy {
            auto_approve: AtomicBool::new(auto_approve),
            tiers: RwLock::new(tiers),
        }
    }

    /// Manual-review mode with the default tier table
    pub fn manual() -> Self {
        Self::new(false, TierTable::default())
    }

    pub fn auto_approve(&self) -> bool {
        self.auto_approve.load(Ordering::Relaxed)
    }

    pub fn set_auto_approve(&self, enabled: bool) {
        self.auto_approve.store(enabled, Ordering::Relaxed);
        tracing::info!(enabled, "auto-approve policy changed");
    }

    /// Grant duration for a plan label (unknown labels get the default)
    pub fn duration_for_plan(&self, plan: &str) -> Duration {
        self.tiers.read().duration_for(plan)
    }

    pub fn set_tier(&self, plan: impl Into<String>, duration: Duration) {
        self.tiers.write().set(plan, duration);
    }

    pub fn remove_tier(&self, plan: &str) {
        self.tiers.write().remove(plan);
    }

    /// Current tier table (copy; edits go through the setters)
    pub fn tiers(&self) -> TierTable {
        self.tiers.read().clone()
    }

    pub fn replace_tiers(&self, tiers: TierTable) {
        *self.tiers.write() = tiers;
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::manual()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_auto_approve() {
        let policy = ApprovalPolicy::manual();
        assert!(!policy.auto_approve());

        policy.set_auto_approve(true);
        assert!(policy.auto_approve());
    }

    #[test]
    fn test_plan_duration_lookup() {
        let policy = ApprovalPolicy::manual();
        assert_eq!(
            policy.duration_for_plan("weekly"),
            Duration::from_secs(7 * 24 * 60 * 60)
        );

        policy.set_tier("daily", Duration::from_secs(24 * 60 * 60));
        assert_eq!(
            policy.duration_for_plan("daily"),
            Duration::from_secs(24 * 60 * 60)
        );
    }
}
