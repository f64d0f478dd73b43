//! In-process rig and simulated viewer

use std::sync::Arc;

use latch_approval::{ApprovalEngine, ApprovalPolicy};
use latch_channel::{EventHub, Subscription};
use latch_client::{AccessCache, Decision};
use latch_core::{AccessKey, Clock, Feature, FeatureId, Subject, TierTable, Timestamp};
use latch_store::{AccessStore, SubmissionLog};

/// Fully wired pipeline on a manual clock
pub struct Rig {
    pub clock: Clock,
    pub store: Arc<AccessStore>,
    pub log: Arc<SubmissionLog>,
    pub policy: Arc<ApprovalPolicy>,
    pub hub: Arc<EventHub>,
    pub engine: Arc<ApprovalEngine>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_auto_approve(false)
    }

    pub fn with_auto_approve(auto_approve: bool) -> Self {
        let clock = Clock::manual(Timestamp::from_secs(1_700_000_000));
        let store = Arc::new(AccessStore::new(clock.clone()));
        let log = Arc::new(SubmissionLog::new(clock.clone()));
        let policy = Arc::new(ApprovalPolicy::new(auto_approve, TierTable::default()));
        let hub = Arc::new(EventHub::default());
        let engine = Arc::new(ApprovalEngine::new(
            Arc::clone(&store),
            Arc::clone(&log),
            Arc::clone(&policy),
            Arc::clone(&hub),
            clock.clone(),
        ));

        Rig {
            clock,
            store,
            log,
            policy,
            hub,
            engine,
        }
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated content viewer session
///
/// Owns one client cache and one hub subscription, and drives them the way
/// a real viewer does: pump events, confirm event-applied entries against
/// the store, reconcile queued keys, poll when asked.
pub struct SimulatedViewer {
    store: Arc<AccessStore>,
    cache: AccessCache,
    subscription: Subscription,
}

impl SimulatedViewer {
    pub fn connect(rig: &Rig, subject: &str) -> Self {
        let subject = Subject::new(subject);
        let subscription = rig.hub.subscribe(subject.clone());

        SimulatedViewer {
            store: Arc::clone(&rig.store),
            cache: AccessCache::new(subject, rig.clock.clone()),
            subscription,
        }
    }

    pub fn track(&mut self, feature: &str, feature_id: &str) -> AccessKey {
        self.cache
            .track(Feature::new(feature), FeatureId::new(feature_id))
    }

    pub fn cache(&mut self) -> &mut AccessCache {
        &mut self.cache
    }

    /// Drain pending subscription events into the cache
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.subscription.try_recv() {
            self.cache.observe_event(&event);
            count += 1;
        }
        count
    }

    /// Run the event-then-confirm reads the cache asked for
    pub async fn confirm(&mut self) {
        for key in self.cache.take_confirmations() {
            let result = self.store.get_grant(&key).await.unwrap_or(None);
            self.cache.complete_fetch(&key, result);
        }
    }

    /// Fetch every key queued for reconciliation
    pub async fn reconcile(&mut self) {
        for key in self.cache.take_reconcile_queue() {
            let result = self.store.get_grant(&key).await.unwrap_or(None);
            self.cache.complete_fetch(&key, result);
        }
    }

    /// Viewer-visible lock state, fetching on a cache miss (the polling
    /// fallback path when no events arrive)
    pub async fn allowed(&mut self, key: &AccessKey) -> bool {
        match self.cache.decision(key) {
            Decision::Allowed { .. } => true,
            Decision::Locked => false,
            Decision::Unknown => {
                let result = self.store.get_grant(key).await.unwrap_or(None);
                self.cache.complete_fetch(key, result);
                matches!(self.cache.decision(key), Decision::Allowed { .. })
            }
        }
    }
}
