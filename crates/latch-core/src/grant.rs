//! Grant - a durable, expiring permission record

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AccessKey, Timestamp};

/// Timed permission for one (subject, feature, featureId) key
///
/// INVARIANT: at most one active grant exists per key. A later grant for the
/// same key overwrites this one entirely; revocation forces the expiry to
/// the revocation instant instead of deleting the row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub key: AccessKey,
    /// First instant at which access is no longer allowed
    pub expires_at: Timestamp,
    pub granted_at: Timestamp,
    /// Human-readable note shown to the subject ("approved by admin", ...)
    pub message: Option<String>,
    /// Set by soft-revoke; the row remains as a short audit trail
    pub revoked: bool,
}

impl Grant {
    pub fn new(key: AccessKey, granted_at: Timestamp, expires_at: Timestamp) -> Self {
        Grant {
            key,
            expires_at,
            granted_at,
            message: None,
            revoked: false,
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Active strictly before expiry: `now < expires_at`
    #[inline]
    pub fn is_active(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }

    /// Time left before expiry (zero once expired)
    pub fn remaining(&self, now: Timestamp) -> Duration {
        self.expires_at - now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Feature, FeatureId, Subject};

    fn key() -> AccessKey {
        AccessKey::new(
            Subject::new("a@example.com"),
            Feature::new("video"),
            FeatureId::new("playlist1"),
        )
    }

    #[test]
    fn test_active_strictly_before_expiry() {
        let expires = Timestamp::from_secs(1000);
        let grant = Grant::new(key(), Timestamp::from_secs(0), expires);

        assert!(grant.is_active(expires - Duration::from_millis(1)));
        assert!(!grant.is_active(expires));
        assert!(!grant.is_active(expires + Duration::from_millis(1)));
    }

    #[test]
    fn test_remaining_saturates_at_zero() {
        let grant = Grant::new(key(), Timestamp::ZERO, Timestamp::from_secs(10));

        assert_eq!(
            grant.remaining(Timestamp::from_secs(4)),
            Duration::from_secs(6)
        );
        assert_eq!(grant.remaining(Timestamp::from_secs(11)), Duration::ZERO);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_expiry_is_a_strict_bound(
                expiry_ms in 1_i64..1_000_000_000_000,
                offset_ms in 0_i64..1_000_000,
            ) {
                let grant = Grant::new(key(), Timestamp::ZERO, Timestamp::from_millis(expiry_ms));

                let before = Timestamp::from_millis((expiry_ms - 1 - offset_ms).max(0));
                let at_or_after = Timestamp::from_millis(expiry_ms + offset_ms);

                prop_assert!(grant.is_active(before));
                prop_assert!(!grant.is_active(at_or_after));
            }
        }
    }
}
