//! Submission log - intake records retained for admin review

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use latch_core::{
    AccessError, AccessKey, AccessResult, Clock, ContactInfo, Submission, SubmissionId,
};

/// Append-mostly log of proof-of-payment submissions
///
/// Rows are keyed by an allocated id and kept in insertion order. Status
/// changes mutate rows in place; only an administrator deletes them.
pub struct SubmissionLog {
    clock: Clock,
    next_id: AtomicU64,
    rows: RwLock<BTreeMap<SubmissionId, Submission>>,
}

impl SubmissionLog {
    pub fn new(clock: Clock) -> Self {
        SubmissionLog {
            clock,
            next_id: AtomicU64::new(1),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a pending submission and allocate its id
    pub async fn insert(
        &self,
        key: AccessKey,
        plan: impl Into<String>,
        proof_ref: impl Into<String>,
        contact: ContactInfo,
    ) -> AccessResult<Submission> {
        let id = SubmissionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let submission =
            Submission::new(id, key, plan, proof_ref, self.clock.now()).with_contact(contact);

        self.rows.write().insert(id, submission.clone());
        tracing::debug!(id = %id, key = %submission.key, "submission recorded");
        Ok(submission)
    }

    pub async fn get(&self, id: SubmissionId) -> AccessResult<Submission> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or(AccessError::SubmissionNotFound(id))
    }

    /// Apply a mutation to a stored row, stamping `updated_at`
    pub async fn update<F>(&self, id: SubmissionId, mutate: F) -> AccessResult<Submission>
    where
        F: FnOnce(&mut Submission),
    {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&id)
            .ok_or(AccessError::SubmissionNotFound(id))?;

        mutate(row);
        row.updated_at = self.clock.now();
        Ok(row.clone())
    }

    /// Administrator deletion; unknown ids are an error
    pub async fn delete(&self, id: SubmissionId) -> AccessResult<()> {
        self.rows
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(AccessError::SubmissionNotFound(id))
    }

    /// Pending rows in id order - the admin review queue
    pub async fn pending(&self) -> AccessResult<Vec<Submission>> {
        let rows = self
            .rows
            .read()
            .values()
            .filter(|row| row.is_pending())
            .cloned()
            .collect();
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latch_core::{Feature, FeatureId, Subject, SubmissionStatus, Timestamp};
    use std::time::Duration;

    fn key() -> AccessKey {
        AccessKey::new(
            Subject::new("a@example.com"),
            Feature::new("video"),
            FeatureId::new("playlist1"),
        )
    }

    fn log() -> (SubmissionLog, Clock) {
        let clock = Clock::manual(Timestamp::from_secs(500));
        (SubmissionLog::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_insert_allocates_sequential_ids() {
        let (log, _clock) = log();

        let first = log
            .insert(key(), "weekly", "proofs/1.png", ContactInfo::default())
            .await
            .unwrap();
        let second = log
            .insert(key(), "monthly", "proofs/2.png", ContactInfo::default())
            .await
            .unwrap();

        assert!(second.id > first.id);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let (log, clock) = log();
        let submission = log
            .insert(key(), "weekly", "proofs/1.png", ContactInfo::default())
            .await
            .unwrap();

        clock.advance(Duration::from_secs(30));
        let updated = log
            .update(submission.id, |row| row.status = SubmissionStatus::Approved)
            .await
            .unwrap();

        assert_eq!(updated.status, SubmissionStatus::Approved);
        assert!(updated.updated_at > submission.created_at);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (log, _clock) = log();
        let missing = SubmissionId::new(99);

        assert_eq!(
            log.get(missing).await.unwrap_err(),
            AccessError::SubmissionNotFound(missing)
        );
        assert_eq!(
            log.delete(missing).await.unwrap_err(),
            AccessError::SubmissionNotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_pending_queue() {
        let (log, _clock) = log();
        let first = log
            .insert(key(), "weekly", "proofs/1.png", ContactInfo::default())
            .await
            .unwrap();
        log.insert(key(), "monthly", "proofs/2.png", ContactInfo::default())
            .await
            .unwrap();

        log.update(first.id, |row| row.status = SubmissionStatus::Rejected)
            .await
            .unwrap();

        let pending = log.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].plan, "monthly");
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let (log, _clock) = log();
        let submission = log
            .insert(key(), "weekly", "proofs/1.png", ContactInfo::default())
            .await
            .unwrap();

        log.delete(submission.id).await.unwrap();
        assert!(log.is_empty());
    }
}
