//! Latch server binary

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use latch_channel::start_heartbeat_loop;
use latch_core::Clock;
use latch_server::{router, AppState, ServerConfig};
use latch_server::tasks::start_sweep_loop;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        addr = %config.bind_addr,
        auto_approve = config.auto_approve,
        "starting latch server"
    );

    let state = AppState::new(config.clone(), Clock::system());
    start_heartbeat_loop(Arc::clone(&state.hub), config.heartbeat_interval);
    start_sweep_loop(Arc::clone(&state.store), config.sweep_interval);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, router(state)).await
}
