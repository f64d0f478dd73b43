//! Submission intake - validation of proof-of-payment requests

use latch_core::{AccessError, AccessKey, AccessResult, ContactInfo, Feature, FeatureId, Subject};

/// Incoming proof-of-payment request
///
/// Feature and feature id must already be canonical: alias resolution
/// (a human-readable playlist name to its id) is the content module's job,
/// not intake's.
#[derive(Clone, Debug)]
pub struct SubmissionRequest {
    pub subject: Subject,
    pub feature: Feature,
    pub feature_id: FeatureId,
    pub plan: String,
    pub proof_ref: String,
    pub contact: ContactInfo,
}

impl SubmissionRequest {
    pub fn new(
        subject: Subject,
        feature: Feature,
        feature_id: FeatureId,
        plan: impl Into<String>,
        proof_ref: impl Into<String>,
    ) -> Self {
        SubmissionRequest {
            subject,
            feature,
            feature_id,
            plan: plan.into(),
            proof_ref: proof_ref.into(),
            contact: ContactInfo::default(),
        }
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    /// Reject requests missing required fields with a user-visible message
    pub fn validate(&self) -> AccessResult<()> {
        if self.subject.is_empty() {
            return Err(AccessError::validation("subject is required"));
        }
        if self.proof_ref.trim().is_empty() {
            return Err(AccessError::validation("payment proof is required"));
        }
        if self.feature.is_empty() || self.feature_id.is_empty() {
            return Err(AccessError::validation("unresolved feature target"));
        }
        Ok(())
    }

    pub fn key(&self) -> AccessKey {
        AccessKey::new(
            self.subject.clone(),
            self.feature.clone(),
            self.feature_id.clone(),
        )
    }
}
