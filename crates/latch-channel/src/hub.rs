//! Event hub - per-subject connection registry and fan-out

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use latch_core::{AccessEvent, Subject};

/// Hub configuration
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Bounded per-connection queue depth; a full queue drops the event,
    /// not the connection
    pub queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig { queue_capacity: 32 }
    }
}

/// Delivery counters
#[derive(Clone, Debug, Default)]
pub struct HubStats {
    pub subscribed: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub pruned: u64,
}

struct Connection {
    id: u64,
    tx: mpsc::Sender<AccessEvent>,
}

/// One long-lived subscription for a subject
///
/// Events for the subject arrive in publish order: each connection owns a
/// single FIFO queue, so a revoke published after a grant is always observed
/// after it.
pub struct Subscription {
    subject: Subject,
    rx: mpsc::Receiver<AccessEvent>,
}

impl Subscription {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Next event; `None` once the hub is gone
    pub async fn recv(&mut self) -> Option<AccessEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<AccessEvent> {
        self.rx.try_recv().ok()
    }

    /// Extract the raw receiver (for stream adapters)
    pub fn into_receiver(self) -> mpsc::Receiver<AccessEvent> {
        self.rx
    }
}

/// Per-subject event fan-out
///
/// Registers one connection per client session, pushes grant/revoke events
/// to every connection registered for the event's subject, and prunes
/// connections whose receiving side has closed.
pub struct EventHub {
    config: HubConfig,
    connections: RwLock<HashMap<Subject, Vec<Connection>>>,
    next_conn_id: AtomicU64,
    subscribed: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    pruned: AtomicU64,
}

impl EventHub {
    pub fn new(config: HubConfig) -> Self {
        EventHub {
            config,
            connections: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
            subscribed: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
        }
    }

    /// Register a connection for a subject
    pub fn subscribe(&self, subject: Subject) -> Subscription {
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);

        self.connections
            .write()
            .entry(subject.clone())
            .or_default()
            .push(Connection { id, tx });
        self.subscribed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(subject = %subject, conn = id, "subscription registered");

        Subscription { subject, rx }
    }

    /// Push an event to every connection registered for its subject
    ///
    /// Returns the number of connections reached. Delivery failures are
    /// logged and ignored - the confirming read on the client restores
    /// consistency regardless.
    pub fn publish(&self, event: &AccessEvent) -> usize {
        let Some(subject) = event.subject().cloned() else {
            return 0;
        };
        self.publish_to(&subject, event)
    }

    /// Push an event to every connection of an explicit subject
    pub fn publish_to(&self, subject: &Subject, event: &AccessEvent) -> usize {
        let mut reached = 0;
        let mut dead = Vec::new();

        {
            let connections = self.connections.read();
            let Some(list) = connections.get(subject) else {
                return 0;
            };

            for conn in list {
                match conn.tx.try_send(event.clone()) {
                    Ok(()) => {
                        reached += 1;
                        self.delivered.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        // Slow consumer: drop the event, keep the connection
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(
                            subject = %subject,
                            conn = conn.id,
                            event = event.name(),
                            "event dropped: queue full"
                        );
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dead.push(conn.id);
                    }
                }
            }
        }

        if !dead.is_empty() {
            self.prune(subject, &dead);
        }
        reached
    }

    /// Heartbeat every connection, pruning those that have closed
    pub fn broadcast_heartbeat(&self) {
        let subjects: Vec<Subject> = self.connections.read().keys().cloned().collect();
        for subject in subjects {
            self.publish_to(&subject, &AccessEvent::Heartbeat);
        }
    }

    fn prune(&self, subject: &Subject, dead: &[u64]) {
        let mut connections = self.connections.write();
        if let Some(list) = connections.get_mut(subject) {
            list.retain(|conn| !dead.contains(&conn.id));
            if list.is_empty() {
                connections.remove(subject);
            }
        }
        self.pruned.fetch_add(dead.len() as u64, Ordering::Relaxed);
        tracing::debug!(subject = %subject, count = dead.len(), "dead connections pruned");
    }

    /// Live connections registered for one subject
    pub fn connections_for(&self, subject: &Subject) -> usize {
        self.connections
            .read()
            .get(subject)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Live connections across all subjects
    pub fn total_connections(&self) -> usize {
        self.connections.read().values().map(Vec::len).sum()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            subscribed: self.subscribed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latch_core::{AccessKey, Feature, FeatureId, Timestamp};

    fn subject() -> Subject {
        Subject::new("a@example.com")
    }

    fn key() -> AccessKey {
        AccessKey::new(subject(), Feature::new("video"), FeatureId::new("p1"))
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let hub = EventHub::default();
        let mut sub = hub.subscribe(subject());

        let event = AccessEvent::grant(key(), Timestamp::from_secs(100), None);
        assert_eq!(hub.publish(&event), 1);

        assert_eq!(sub.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_per_subject_order_preserved() {
        let hub = EventHub::default();
        let mut sub = hub.subscribe(subject());

        hub.publish(&AccessEvent::grant(key(), Timestamp::from_secs(100), None));
        hub.publish(&AccessEvent::revoke(key()));

        assert!(matches!(
            sub.recv().await.unwrap(),
            AccessEvent::Grant { .. }
        ));
        assert!(matches!(
            sub.recv().await.unwrap(),
            AccessEvent::Revoke { .. }
        ));
    }

    #[tokio::test]
    async fn test_subject_isolation() {
        let hub = EventHub::default();
        let mut ours = hub.subscribe(subject());
        let mut theirs = hub.subscribe(Subject::new("b@example.com"));

        hub.publish(&AccessEvent::revoke(key()));

        assert!(ours.try_recv().is_some());
        assert!(theirs.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_closed_connections_pruned() {
        let hub = EventHub::default();
        let sub = hub.subscribe(subject());
        assert_eq!(hub.connections_for(&subject()), 1);

        drop(sub);
        assert_eq!(hub.publish(&AccessEvent::revoke(key())), 0);

        assert_eq!(hub.connections_for(&subject()), 0);
        assert_eq!(hub.stats().pruned, 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_event_not_connection() {
        let hub = EventHub::new(HubConfig { queue_capacity: 1 });
        let mut sub = hub.subscribe(subject());

        hub.publish(&AccessEvent::grant(key(), Timestamp::from_secs(1), None));
        // Queue is full: this event is dropped, the connection survives
        hub.publish(&AccessEvent::grant(key(), Timestamp::from_secs(2), None));

        assert_eq!(hub.connections_for(&subject()), 1);
        assert_eq!(hub.stats().dropped, 1);

        // Draining makes room again
        sub.recv().await.unwrap();
        assert_eq!(hub.publish(&AccessEvent::revoke(key())), 1);
    }

    #[tokio::test]
    async fn test_heartbeat_reaches_every_subject() {
        let hub = EventHub::default();
        let mut first = hub.subscribe(subject());
        let mut second = hub.subscribe(Subject::new("b@example.com"));

        hub.broadcast_heartbeat();

        assert_eq!(first.try_recv().unwrap(), AccessEvent::Heartbeat);
        assert_eq!(second.try_recv().unwrap(), AccessEvent::Heartbeat);
    }
}
