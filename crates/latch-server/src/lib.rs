//! Latch Server - HTTP surface for the access-grant pipeline
//!
//! Endpoints:
//! - `POST /api/submissions` - proof-of-payment intake
//! - `POST /api/submissions/{id}/approve|reject|revoke` - admin review
//! - `DELETE /api/submissions/{id}` - admin deletion
//! - `GET /api/submissions` - admin pending queue
//! - `POST /api/revoke` - admin revoke by (subject, feature, featureId)
//! - `GET /api/access` - access check; also the polling fallback
//! - `GET /api/events/{subject}` - per-subject SSE stream
//! - `GET/PUT /api/policy` - auto-approve flag and tier table
//! - `GET /health`
//!
//! Admin authority is a shared static key in the `x-admin-key` header.

pub mod config;
pub mod error;
pub mod api;
pub mod sse;
pub mod tasks;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use latch_approval::{ApprovalEngine, ApprovalPolicy};
use latch_channel::{EventHub, HubConfig};
use latch_core::{Clock, TierTable};
use latch_store::{AccessStore, SubmissionLog};

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handles behind every request handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ApprovalEngine>,
    pub store: Arc<AccessStore>,
    pub log: Arc<SubmissionLog>,
    pub policy: Arc<ApprovalPolicy>,
    pub hub: Arc<EventHub>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, clock: Clock) -> Self {
        let store = Arc::new(AccessStore::new(clock.clone()));
        let log = Arc::new(SubmissionLog::new(clock.clone()));
        let policy = Arc::new(ApprovalPolicy::new(config.auto_approve, TierTable::default()));
        let hub = Arc::new(EventHub::new(HubConfig::default()));
        let engine = Arc::new(ApprovalEngine::new(
            Arc::clone(&store),
            Arc::clone(&log),
            Arc::clone(&policy),
            Arc::clone(&hub),
            clock,
        ));

        AppState {
            engine,
            store,
            log,
            policy,
            hub,
            config: Arc::new(config),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/submissions", post(api::submit).get(api::pending))
        .route("/api/submissions/:id/approve", post(api::approve))
        .route("/api/submissions/:id/reject", post(api::reject))
        .route("/api/submissions/:id/revoke", post(api::revoke))
        .route("/api/submissions/:id", delete(api::delete_submission))
        .route("/api/revoke", post(api::revoke_key))
        .route("/api/access", get(api::access_check))
        .route("/api/events/:subject", get(sse::events))
        .route("/api/policy", get(api::get_policy).put(api::put_policy))
        .with_state(state)
}
