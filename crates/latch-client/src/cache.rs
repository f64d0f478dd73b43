//! Client-side grant cache with event-then-confirm reconciliation

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use latch_core::{AccessEvent, AccessKey, Clock, Feature, FeatureId, Grant, Subject, Timestamp};

/// Cache configuration
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How long a negative ("no grant") marker suppresses repeat queries.
    /// Markers live in memory only; positive grants are the only entries
    /// treated as authoritative.
    pub miss_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            miss_ttl: Duration::from_secs(5),
        }
    }
}

/// Cache counters
#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub events_applied: u64,
    pub confirms_requested: u64,
    pub reconcile_passes: u64,
}

/// Answer for one feature instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Cached grant is active - trust it, zero round-trip
    Allowed {
        expires_at: Timestamp,
        message: Option<String>,
    },
    /// Known to have no grant (fresh negative marker)
    Locked,
    /// Not known locally - the driver must query the store
    Unknown,
}

#[derive(Clone, Debug)]
struct CachedGrant {
    expires_at: Timestamp,
    message: Option<String>,
}

/// Per-session map from tracked feature instances to cached grants
///
/// INVARIANT: the store is the source of truth. Events flip state eagerly
/// for latency, but every event-applied entry is confirmed against the
/// store, and the confirming read always wins over the event payload.
pub struct AccessCache {
    subject: Subject,
    config: CacheConfig,
    clock: Clock,
    tracked: HashSet<AccessKey>,
    grants: HashMap<AccessKey, CachedGrant>,
    misses: HashMap<AccessKey, Timestamp>,
    pending_confirm: HashSet<AccessKey>,
    reconcile_queue: HashSet<AccessKey>,
    stats: CacheStats,
}

impl AccessCache {
    pub fn new(subject: Subject, clock: Clock) -> Self {
        Self::with_config(subject, clock, CacheConfig::default())
    }

    pub fn with_config(subject: Subject, clock: Clock, config: CacheConfig) -> Self {
        AccessCache {
            subject,
            config,
            clock,
            tracked: HashSet::new(),
            grants: HashMap::new(),
            misses: HashMap::new(),
            pending_confirm: HashSet::new(),
            reconcile_queue: HashSet::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Register a visible feature instance and return its key
    pub fn track(&mut self, feature: Feature, feature_id: FeatureId) -> AccessKey {
        let key = AccessKey::new(self.subject.clone(), feature, feature_id);
        self.tracked.insert(key.clone());
        key
    }

    /// Answer for a key from local state only
    pub fn decision(&mut self, key: &AccessKey) -> Decision {
        let now = self.clock.now();

        if let Some(cached) = self.grants.get(key) {
            if now < cached.expires_at {
                self.stats.hits += 1;
                return Decision::Allowed {
                    expires_at: cached.expires_at,
                    message: cached.message.clone(),
                };
            }
            // Expired entry: drop it and fall through to a fresh query
            self.grants.remove(key);
        }

        if let Some(recorded_at) = self.misses.get(key) {
            if now - *recorded_at < self.config.miss_ttl {
                self.stats.hits += 1;
                return Decision::Locked;
            }
            self.misses.remove(key);
        }

        self.stats.misses += 1;
        Decision::Unknown
    }

    /// Record the store's answer for a key
    ///
    /// This is the authoritative write path: it overwrites whatever an
    /// earlier event put in the cache and clears any pending confirmation.
    pub fn complete_fetch(&mut self, key: &AccessKey, result: Option<Grant>) {
        let now = self.clock.now();
        self.pending_confirm.remove(key);

        match result {
            Some(grant) if grant.is_active(now) => {
                self.misses.remove(key);
                self.grants.insert(
                    key.clone(),
                    CachedGrant {
                        expires_at: grant.expires_at,
                        message: grant.message,
                    },
                );
            }
            _ => {
                self.grants.remove(key);
                self.misses.insert(key.clone(), now);
            }
        }
    }

    /// Apply a subscription event
    ///
    /// Grant events for tracked keys flip state immediately (no round-trip)
    /// and mark the key for one confirming read. Revoke events clear the
    /// key immediately; no confirmation needed, locked is the safe state.
    pub fn observe_event(&mut self, event: &AccessEvent) {
        match event {
            AccessEvent::Grant {
                key,
                expires_at,
                message,
            } => {
                if !self.tracked.contains(key) {
                    return;
                }
                self.stats.events_applied += 1;
                self.misses.remove(key);
                self.grants.insert(
                    key.clone(),
                    CachedGrant {
                        expires_at: *expires_at,
                        message: message.clone(),
                    },
                );
                if self.pending_confirm.insert(key.clone()) {
                    self.stats.confirms_requested += 1;
                }
            }
            AccessEvent::Revoke { key } => {
                if !self.tracked.contains(key) {
                    return;
                }
                self.stats.events_applied += 1;
                self.grants.remove(key);
                self.pending_confirm.remove(key);
                self.misses.insert(key.clone(), self.clock.now());
                tracing::debug!(key = %key, "revoke event applied, viewer locked");
            }
            AccessEvent::Heartbeat => {}
        }
    }

    /// Keys awaiting an event-then-confirm read against the store
    pub fn take_confirmations(&mut self) -> Vec<AccessKey> {
        self.pending_confirm.drain().collect()
    }

    /// Nearest upcoming expiry across cached grants - arm one timer for
    /// this instant rather than one per item
    pub fn next_expiry(&self) -> Option<Timestamp> {
        self.grants.values().map(|cached| cached.expires_at).min()
    }

    /// Expiry timer fired: drop stale entries and queue every tracked key
    /// for revalidation (lazy bulk pass)
    pub fn on_expiry(&mut self) {
        let now = self.clock.now();
        self.grants.retain(|_, cached| now < cached.expires_at);
        self.queue_all_tracked();
    }

    /// Session came back to the foreground: full reconciliation pass,
    /// defending against events missed while backgrounded
    pub fn on_refocus(&mut self) {
        self.misses.clear();
        self.queue_all_tracked();
        tracing::debug!(subject = %self.subject, tracked = self.tracked.len(), "refocus reconciliation queued");
    }

    /// Keys the driver must fetch now
    pub fn take_reconcile_queue(&mut self) -> Vec<AccessKey> {
        self.reconcile_queue.drain().collect()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn queue_all_tracked(&mut self) {
        self.stats.reconcile_passes += 1;
        for key in &self.tracked {
            self.reconcile_queue.insert(key.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> (AccessCache, Clock) {
        let clock = Clock::manual(Timestamp::from_secs(1_000));
        (
            AccessCache::new(Subject::new("a@example.com"), clock.clone()),
            clock,
        )
    }

    fn grant(key: &AccessKey, expires_at: Timestamp) -> Grant {
        Grant::new(key.clone(), Timestamp::ZERO, expires_at)
    }

    #[test]
    fn test_unknown_until_fetched() {
        let (mut cache, clock) = cache();
        let key = cache.track(Feature::new("video"), FeatureId::new("p1"));

        assert_eq!(cache.decision(&key), Decision::Unknown);

        let expires = clock.now() + Duration::from_secs(60);
        cache.complete_fetch(&key, Some(grant(&key, expires)));

        assert_eq!(
            cache.decision(&key),
            Decision::Allowed {
                expires_at: expires,
                message: None
            }
        );
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_negative_marker_expires() {
        let (mut cache, clock) = cache();
        let key = cache.track(Feature::new("pdf"), FeatureId::new("n1"));

        cache.complete_fetch(&key, None);
        assert_eq!(cache.decision(&key), Decision::Locked);

        // Marker outlives its TTL: back to Unknown so the driver re-queries
        clock.advance(Duration::from_secs(6));
        assert_eq!(cache.decision(&key), Decision::Unknown);
    }

    #[test]
    fn test_cache_flips_exactly_at_expiry() {
        let (mut cache, clock) = cache();
        let key = cache.track(Feature::new("video"), FeatureId::new("p1"));
        let expires = clock.now() + Duration::from_secs(60);
        cache.complete_fetch(&key, Some(grant(&key, expires)));

        clock.set(expires - Duration::from_millis(1));
        assert!(matches!(cache.decision(&key), Decision::Allowed { .. }));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.decision(&key), Decision::Unknown);
    }

    #[test]
    fn test_grant_event_applies_then_confirms() {
        let (mut cache, clock) = cache();
        let key = cache.track(Feature::new("video"), FeatureId::new("p1"));
        let event_expiry = clock.now() + Duration::from_secs(60);

        cache.observe_event(&AccessEvent::grant(key.clone(), event_expiry, None));

        // Flipped immediately, no round-trip
        assert!(matches!(cache.decision(&key), Decision::Allowed { .. }));
        let confirms = cache.take_confirmations();
        assert_eq!(confirms, vec![key.clone()]);

        // The store disagrees (race): its answer wins over the event payload
        let store_expiry = clock.now() + Duration::from_secs(10);
        cache.complete_fetch(&key, Some(grant(&key, store_expiry)));
        assert_eq!(
            cache.decision(&key),
            Decision::Allowed {
                expires_at: store_expiry,
                message: None
            }
        );
    }

    #[test]
    fn test_confirming_read_can_clear_event_grant() {
        let (mut cache, clock) = cache();
        let key = cache.track(Feature::new("video"), FeatureId::new("p1"));

        cache.observe_event(&AccessEvent::grant(
            key.clone(),
            clock.now() + Duration::from_secs(60),
            None,
        ));
        // Store says there is no grant after all
        cache.complete_fetch(&key, None);

        assert_eq!(cache.decision(&key), Decision::Locked);
    }

    #[test]
    fn test_revoke_event_locks_immediately() {
        let (mut cache, clock) = cache();
        let key = cache.track(Feature::new("video"), FeatureId::new("p1"));
        cache.complete_fetch(&key, Some(grant(&key, clock.now() + Duration::from_secs(60))));

        cache.observe_event(&AccessEvent::revoke(key.clone()));

        assert_eq!(cache.decision(&key), Decision::Locked);
        assert!(cache.take_confirmations().is_empty());
    }

    #[test]
    fn test_untracked_events_ignored() {
        let (mut cache, clock) = cache();
        cache.track(Feature::new("video"), FeatureId::new("p1"));
        let other = AccessKey::new(
            Subject::new("a@example.com"),
            Feature::new("video"),
            FeatureId::new("p2"),
        );

        cache.observe_event(&AccessEvent::grant(
            other,
            clock.now() + Duration::from_secs(60),
            None,
        ));
        assert!(cache.take_confirmations().is_empty());
        assert_eq!(cache.stats().events_applied, 0);
    }

    #[test]
    fn test_single_timer_over_nearest_expiry() {
        let (mut cache, clock) = cache();
        let near = cache.track(Feature::new("video"), FeatureId::new("p1"));
        let far = cache.track(Feature::new("pdf"), FeatureId::new("n1"));

        let near_expiry = clock.now() + Duration::from_secs(10);
        let far_expiry = clock.now() + Duration::from_secs(600);
        cache.complete_fetch(&near, Some(grant(&near, near_expiry)));
        cache.complete_fetch(&far, Some(grant(&far, far_expiry)));

        assert_eq!(cache.next_expiry(), Some(near_expiry));

        // Timer fires: stale entry dropped, all tracked keys queued
        clock.set(near_expiry);
        cache.on_expiry();

        assert_eq!(cache.take_reconcile_queue().len(), 2);
        assert_eq!(cache.next_expiry(), Some(far_expiry));
    }

    #[test]
    fn test_refocus_queues_full_pass() {
        let (mut cache, _clock) = cache();
        cache.track(Feature::new("video"), FeatureId::new("p1"));
        cache.track(Feature::new("podcast"), FeatureId::new("s1"));

        cache.on_refocus();
        assert_eq!(cache.take_reconcile_queue().len(), 2);
        assert_eq!(cache.stats().reconcile_passes, 1);
    }
}
