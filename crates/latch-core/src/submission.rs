//! Submission - a user-initiated request for a grant, carrying proof of payment

use serde::{Deserialize, Serialize};

use crate::{AccessKey, SubmissionId, Timestamp};

/// Submission lifecycle status
///
/// Transitions are one-directional except the admin-triggered
/// revoke/re-approve pair; nothing ever returns to Pending and Rejected is
/// terminal. An admin creates a fresh submission instead of reviving one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
    Revoked,
}

impl SubmissionStatus {
    /// Whether the state machine permits moving to `next`
    pub fn can_become(self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;

        match (self, next) {
            (Pending, Approved) | (Pending, Rejected) => true,
            // Re-approval extends the grant; revoke is idempotent
            (Approved, Approved) | (Approved, Revoked) | (Revoked, Approved) => true,
            (Revoked, Revoked) => true,
            // Revoke always succeeds from the caller's perspective
            (Pending, Revoked) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Rejected)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Revoked => "revoked",
        };
        write!(f, "{}", label)
    }
}

/// Contact details captured at intake
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Proof-of-payment request record
///
/// Retained until an administrator deletes it; unlike a grant it is never
/// time-governed. Mutated in place on status changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub key: AccessKey,
    /// Plan label chosen by the subject ("weekly", "monthly", ...)
    pub plan: String,
    /// Reference to the uploaded payment screenshot
    pub proof_ref: String,
    #[serde(default)]
    pub contact: ContactInfo,
    pub status: SubmissionStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Submission {
    pub fn new(
        id: SubmissionId,
        key: AccessKey,
        plan: impl Into<String>,
        proof_ref: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Submission {
            id,
            key,
            plan: plan.into(),
            proof_ref: proof_ref.into(),
            contact: ContactInfo::default(),
            status: SubmissionStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }
}
