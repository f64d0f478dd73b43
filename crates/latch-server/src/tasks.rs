//! Background maintenance tasks

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use latch_store::AccessStore;

/// Start the periodic expired-grant sweep
///
/// The sweep only reclaims memory; lazy expiry at read time already hides
/// expired rows, so a failed or delayed pass is logged and retried on the
/// next tick.
pub fn start_sweep_loop(store: Arc<AccessStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.sweep_expired().await {
                Ok(removed) if removed > 0 => {
                    tracing::debug!(removed, "sweep pass complete");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "sweep pass failed"),
            }
        }
    })
}
