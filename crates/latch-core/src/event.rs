//! Subscription events - ephemeral grant/revoke notifications
//!
//! Events are a low-latency hint pushed to connected clients; they are never
//! persisted and never the source of truth. A client that misses one
//! recovers by re-querying the Access Store.

use serde::{Deserialize, Serialize};

use crate::{AccessKey, Subject, Timestamp};

/// Event broadcast over the propagation channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEvent {
    /// Access was granted or extended for a key
    Grant {
        key: AccessKey,
        expires_at: Timestamp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Access was revoked for a key
    Revoke { key: AccessKey },
    /// Liveness signal for idle connections
    Heartbeat,
}

impl AccessEvent {
    pub fn grant(key: AccessKey, expires_at: Timestamp, message: Option<String>) -> Self {
        AccessEvent::Grant {
            key,
            expires_at,
            message,
        }
    }

    pub fn revoke(key: AccessKey) -> Self {
        AccessEvent::Revoke { key }
    }

    /// Wire name, used as the SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            AccessEvent::Grant { .. } => "grant",
            AccessEvent::Revoke { .. } => "revoke",
            AccessEvent::Heartbeat => "heartbeat",
        }
    }

    /// Subject the event addresses (heartbeats address the connection)
    pub fn subject(&self) -> Option<&Subject> {
        match self {
            AccessEvent::Grant { key, .. } | AccessEvent::Revoke { key } => Some(&key.subject),
            AccessEvent::Heartbeat => None,
        }
    }

    pub fn key(&self) -> Option<&AccessKey> {
        match self {
            AccessEvent::Grant { key, .. } | AccessEvent::Revoke { key } => Some(key),
            AccessEvent::Heartbeat => None,
        }
    }
}
