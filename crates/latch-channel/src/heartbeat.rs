//! Heartbeat loop - keeps idle connections alive and detects silent drops

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::EventHub;

/// Start a background heartbeat loop
///
/// Every interval, each live connection receives a `heartbeat` event;
/// connections whose receiving side has closed are pruned as a side effect.
/// Clients that stop seeing heartbeats treat the stream as dead, reconnect,
/// and re-check state against the store.
pub fn start_heartbeat_loop(hub: Arc<EventHub>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; skip it so idle streams get a full
        // interval before the first heartbeat
        ticker.tick().await;

        loop {
            ticker.tick().await;
            hub.broadcast_heartbeat();
        }
    })
}
