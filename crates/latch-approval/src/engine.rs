//! Approval engine - the only writer of grants
//!
//! State machine per submission:
//! pending -> approved, pending -> rejected, approved -> approved
//! (re-grant extends), approved -> revoked, revoked -> approved.
//! Nothing returns to pending; rejected is terminal.

use std::sync::Arc;
use std::time::Duration;

use latch_channel::EventHub;
use latch_core::{
    AccessError, AccessEvent, AccessKey, AccessResult, Clock, Grant, Submission, SubmissionId,
    SubmissionStatus,
};
use latch_store::{AccessStore, SubmissionLog};

use crate::{ApprovalPolicy, SubmissionRequest};

/// Turns pending submissions into expiring grants and propagates changes
pub struct ApprovalEngine {
    store: Arc<AccessStore>,
    log: Arc<SubmissionLog>,
    policy: Arc<ApprovalPolicy>,
    hub: Arc<EventHub>,
    clock: Clock,
}

impl ApprovalEngine {
    pub fn new(
        store: Arc<AccessStore>,
        log: Arc<SubmissionLog>,
        policy: Arc<ApprovalPolicy>,
        hub: Arc<EventHub>,
        clock: Clock,
    ) -> Self {
        ApprovalEngine {
            store,
            log,
            policy,
            hub,
            clock,
        }
    }

    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Intake: record a pending submission, auto-approving when the policy
    /// flag is set
    pub async fn submit(&self, request: SubmissionRequest) -> AccessResult<Submission> {
        request.validate()?;

        let submission = self
            .log
            .insert(
                request.key(),
                request.plan.clone(),
                request.proof_ref.clone(),
                request.contact.clone(),
            )
            .await?;
        tracing::info!(id = %submission.id, key = %submission.key, plan = %submission.plan, "submission received");

        if self.policy.auto_approve() {
            let duration = self.policy.duration_for_plan(&submission.plan);
            self.approve(submission.id, duration, Some("auto approved".to_owned()))
                .await?;
            return self.log.get(submission.id).await;
        }

        Ok(submission)
    }

    /// Grant access for `duration` from now
    ///
    /// The grant write comes first; the submission status flips only after
    /// it succeeds, and the event is emitted last. A failure anywhere
    /// aborts the remainder, so a submission is never approved without its
    /// grant. Approving an approved submission re-extends without error.
    pub async fn approve(
        &self,
        id: SubmissionId,
        duration: Duration,
        message: Option<String>,
    ) -> AccessResult<Grant> {
        let submission = self.log.get(id).await?;
        self.check_transition(&submission, SubmissionStatus::Approved)?;

        let expires_at = self.clock.now() + duration;
        let grant = self
            .store
            .upsert_grant(submission.key.clone(), expires_at, message.clone())
            .await?;

        self.log
            .update(id, |row| row.status = SubmissionStatus::Approved)
            .await?;
        tracing::info!(id = %id, key = %submission.key, expires_at = ?expires_at, "submission approved");

        self.hub.publish(&AccessEvent::grant(
            submission.key,
            expires_at,
            message,
        ));
        Ok(grant)
    }

    /// Reject a pending submission (terminal)
    pub async fn reject(&self, id: SubmissionId) -> AccessResult<Submission> {
        let submission = self.log.get(id).await?;
        self.check_transition(&submission, SubmissionStatus::Rejected)?;

        let updated = self
            .log
            .update(id, |row| row.status = SubmissionStatus::Rejected)
            .await?;
        tracing::info!(id = %id, key = %updated.key, "submission rejected");
        Ok(updated)
    }

    /// Revoke whatever grant the submission produced
    ///
    /// Always succeeds for a known id, whether or not a grant exists. A
    /// rejected submission keeps its terminal status; everything else is
    /// marked revoked.
    pub async fn revoke(&self, id: SubmissionId) -> AccessResult<()> {
        let submission = self.log.get(id).await?;

        self.store.revoke_grant(&submission.key).await?;
        if submission.status.can_become(SubmissionStatus::Revoked) {
            self.log
                .update(id, |row| row.status = SubmissionStatus::Revoked)
                .await?;
        }
        tracing::info!(id = %id, key = %submission.key, "submission revoked");

        self.hub.publish(&AccessEvent::revoke(submission.key));
        Ok(())
    }

    /// Admin revoke addressed by key instead of submission id
    pub async fn revoke_key(&self, key: AccessKey) -> AccessResult<()> {
        self.store.revoke_grant(&key).await?;
        tracing::info!(key = %key, "grant revoked by key");

        self.hub.publish(&AccessEvent::revoke(key));
        Ok(())
    }

    fn check_transition(&self, submission: &Submission, to: SubmissionStatus) -> AccessResult<()> {
        if submission.status.can_become(to) {
            Ok(())
        } else {
            Err(AccessError::InvalidTransition {
                from: submission.status,
                to,
            })
        }
    }
}
