//! Request handlers and wire types

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use latch_approval::SubmissionRequest;
use latch_core::{
    AccessError, AccessKey, ContactInfo, Feature, FeatureId, Grant, Subject, Submission,
    SubmissionId, SubmissionStatus, TierTable, Timestamp,
};

use crate::{ApiError, AppState};

/// Header carrying the shared admin key
const ADMIN_KEY_HEADER: &str = "x-admin-key";

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided == Some(state.config.admin_key.as_str()) {
        Ok(())
    } else {
        Err(AccessError::Unauthorized.into())
    }
}

pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct IntakeBody {
    pub subject: String,
    pub feature: String,
    pub feature_id: String,
    pub plan: String,
    pub proof_ref: String,
    #[serde(default)]
    pub contact: ContactInfo,
}

#[derive(Debug, Serialize)]
pub struct IntakeReply {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    /// Present when the auto-approve policy granted access immediately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

/// Proof-of-payment intake
///
/// Bounded by the intake timeout: a stalled store surfaces a retryable
/// error instead of a hung request.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<IntakeBody>,
) -> Result<Json<IntakeReply>, ApiError> {
    let request = SubmissionRequest::new(
        Subject::new(body.subject),
        Feature::new(body.feature),
        FeatureId::new(body.feature_id),
        body.plan,
        body.proof_ref,
    )
    .with_contact(body.contact);

    let submission = tokio::time::timeout(state.config.intake_timeout, state.engine.submit(request))
        .await
        .map_err(|_| AccessError::Timeout)??;

    let expires_at = if submission.status == SubmissionStatus::Approved {
        state
            .store
            .get_grant(&submission.key)
            .await?
            .map(|grant| grant.expires_at)
    } else {
        None
    };

    Ok(Json(IntakeReply {
        submission_id: submission.id,
        status: submission.status,
        expires_at,
    }))
}

/// Admin pending queue
pub async fn pending(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Submission>>, ApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.log.pending().await?))
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
    pub duration_secs: u64,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<ApproveBody>,
) -> Result<Json<Grant>, ApiError> {
    require_admin(&state, &headers)?;
    let grant = state
        .engine
        .approve(
            SubmissionId::new(id),
            Duration::from_secs(body.duration_secs),
            body.message,
        )
        .await?;
    Ok(Json(grant))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<Submission>, ApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.engine.reject(SubmissionId::new(id)).await?))
}

pub async fn revoke(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    state.engine.revoke(SubmissionId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    state.log.delete(SubmissionId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RevokeKeyBody {
    pub subject: String,
    pub feature: String,
    pub feature_id: String,
}

/// Admin revoke addressed by key; succeeds whether or not a grant exists
pub async fn revoke_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RevokeKeyBody>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    let key = AccessKey::new(
        Subject::new(body.subject),
        Feature::new(body.feature),
        FeatureId::new(body.feature_id),
    );
    state.engine.revoke_key(key).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub subject: String,
    pub feature: String,
    pub feature_id: String,
}

#[derive(Debug, Serialize)]
pub struct AccessReply {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Current access state for a key; doubles as the polling fallback for
/// clients without a live event stream
pub async fn access_check(
    State(state): State<AppState>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessReply>, ApiError> {
    let key = AccessKey::new(
        Subject::new(query.subject),
        Feature::new(query.feature),
        FeatureId::new(query.feature_id),
    );

    let reply = match state.store.get_grant(&key).await? {
        Some(grant) => AccessReply {
            allowed: true,
            expires_at: Some(grant.expires_at),
            message: grant.message,
        },
        None => AccessReply {
            allowed: false,
            expires_at: None,
            message: None,
        },
    };
    Ok(Json(reply))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyView {
    pub auto_approve: bool,
    /// Plan label -> grant duration in seconds
    pub tiers: BTreeMap<String, u64>,
    pub default_secs: u64,
}

pub async fn get_policy(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PolicyView>, ApiError> {
    require_admin(&state, &headers)?;

    let tiers = state.policy.tiers();
    Ok(Json(PolicyView {
        auto_approve: state.policy.auto_approve(),
        tiers: tiers
            .iter()
            .map(|(label, duration)| (label.to_owned(), duration.as_secs()))
            .collect(),
        default_secs: tiers.default_duration().as_secs(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PolicyUpdate {
    #[serde(default)]
    pub auto_approve: Option<bool>,
    #[serde(default)]
    pub tiers: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub default_secs: Option<u64>,
}

pub async fn put_policy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<PolicyUpdate>,
) -> Result<Json<PolicyView>, ApiError> {
    require_admin(&state, &headers)?;

    if let Some(enabled) = update.auto_approve {
        state.policy.set_auto_approve(enabled);
    }
    if update.tiers.is_some() || update.default_secs.is_some() {
        let mut table = match update.tiers {
            Some(tiers) => {
                let mut table = TierTable::empty();
                for (label, secs) in tiers {
                    table.set(label, Duration::from_secs(secs));
                }
                table
            }
            None => state.policy.tiers(),
        };
        if let Some(secs) = update.default_secs {
            table.set_default_duration(Duration::from_secs(secs));
        }
        state.policy.replace_tiers(table);
    }

    get_policy(State(state), headers).await
}
