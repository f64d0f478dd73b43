//! Grant map - the single source of truth for access state

use std::collections::HashMap;

use parking_lot::RwLock;

use latch_core::{AccessKey, AccessResult, Clock, Grant, Subject, Timestamp};

/// Durable record of grants keyed by (subject, feature, featureId)
///
/// Writes are last-writer-wins: grants are monotonically-intended
/// extensions, so concurrent upserts on one key need no application-level
/// locking beyond whichever write lands last. Reads apply lazy expiry -
/// expired rows are reported as absent whether or not the sweep has
/// physically removed them.
pub struct AccessStore {
    clock: Clock,
    grants: RwLock<HashMap<AccessKey, Grant>>,
}

impl AccessStore {
    pub fn new(clock: Clock) -> Self {
        AccessStore {
            clock,
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Idempotent write; overwrites any previous grant for the key
    pub async fn upsert_grant(
        &self,
        key: AccessKey,
        expires_at: Timestamp,
        message: Option<String>,
    ) -> AccessResult<Grant> {
        let grant = Grant::new(key.clone(), self.clock.now(), expires_at).with_message(message);

        self.grants.write().insert(key, grant.clone());
        tracing::debug!(key = %grant.key, expires_at = ?grant.expires_at, "grant upserted");
        Ok(grant)
    }

    /// Soft-revoke: forces expiry to now, keeping the row for audit
    ///
    /// Succeeds whether or not a grant exists.
    pub async fn revoke_grant(&self, key: &AccessKey) -> AccessResult<()> {
        let now = self.clock.now();
        if let Some(grant) = self.grants.write().get_mut(key) {
            grant.expires_at = now;
            grant.revoked = true;
            tracing::debug!(key = %key, "grant revoked");
        }
        Ok(())
    }

    /// Current grant for a key, `None` when absent or expired
    ///
    /// Reads never delete; the sweep handles physical cleanup.
    pub async fn get_grant(&self, key: &AccessKey) -> AccessResult<Option<Grant>> {
        let now = self.clock.now();
        let grant = self
            .grants
            .read()
            .get(key)
            .filter(|grant| grant.is_active(now))
            .cloned();
        Ok(grant)
    }

    /// All active grants for one subject
    ///
    /// Used by reconnecting clients to recover events missed while offline.
    pub async fn grants_for_subject(&self, subject: &Subject) -> AccessResult<Vec<Grant>> {
        let now = self.clock.now();
        let grants = self
            .grants
            .read()
            .values()
            .filter(|grant| grant.key.subject == *subject && grant.is_active(now))
            .cloned()
            .collect();
        Ok(grants)
    }

    /// Physically delete expired rows; returns how many were removed
    ///
    /// Purely an optimization - lazy expiry at read time is the source of
    /// truth, so correctness never depends on the sweep running.
    pub async fn sweep_expired(&self) -> AccessResult<usize> {
        let now = self.clock.now();
        let mut grants = self.grants.write();
        let before = grants.len();
        grants.retain(|_, grant| grant.is_active(now));
        let removed = before - grants.len();

        if removed > 0 {
            tracing::debug!(removed, "expired grants swept");
        }
        Ok(removed)
    }

    /// Number of physically stored rows, expired rows included
    pub fn len(&self) -> usize {
        self.grants.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.read().is_empty()
    }
}
