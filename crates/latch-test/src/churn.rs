//! Churn fuzzing - random operation interleavings against a model
//!
//! Drives the pipeline with a seeded stream of approvals, revokes, clock
//! jumps, and sweeps while checking the store against a shadow model. The
//! invariant under test: at most one active grant per key, visible iff
//! `now < expiry`, with the latest write governing.

use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use latch_approval::SubmissionRequest;
use latch_core::{AccessKey, Feature, FeatureId, Subject, Timestamp};

use crate::Rig;

/// Churn run configuration
#[derive(Clone, Debug)]
pub struct ChurnConfig {
    pub seed: u64,
    pub operations: u32,
    pub subjects: u32,
    pub features_per_subject: u32,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        ChurnConfig {
            seed: 0x1a7c4,
            operations: 500,
            subjects: 4,
            features_per_subject: 3,
        }
    }
}

/// Outcome counters for one churn run
#[derive(Clone, Debug, Default)]
pub struct ChurnReport {
    pub approvals: u32,
    pub revokes: u32,
    pub clock_jumps: u32,
    pub sweeps: u32,
    /// Disagreements between the store and the shadow model
    pub violations: u32,
}

/// Run a seeded churn sequence, comparing the store to a shadow model
pub async fn run_churn(config: ChurnConfig) -> ChurnReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let rig = Rig::new();
    let mut report = ChurnReport::default();

    // Shadow model: expected expiry per key
    let mut model: HashMap<AccessKey, Timestamp> = HashMap::new();

    let keys: Vec<AccessKey> = (0..config.subjects)
        .flat_map(|subject| {
            (0..config.features_per_subject).map(move |feature| (subject, feature))
        })
        .map(|(subject, feature)| {
            AccessKey::new(
                Subject::new(format!("user{subject}@example.com")),
                Feature::new("video"),
                FeatureId::new(format!("playlist{feature}")),
            )
        })
        .collect();

    for _ in 0..config.operations {
        let key = keys[rng.gen_range(0..keys.len())].clone();

        match rng.gen_range(0u32..10) {
            // Approve a fresh submission for a random duration
            0..=4 => {
                let duration = Duration::from_secs(rng.gen_range(1..3600));
                let request = SubmissionRequest::new(
                    key.subject.clone(),
                    key.feature.clone(),
                    key.feature_id.clone(),
                    "weekly",
                    "proofs/churn.png",
                );
                let submission = rig.engine.submit(request).await.unwrap();
                rig.engine
                    .approve(submission.id, duration, None)
                    .await
                    .unwrap();

                model.insert(key.clone(), rig.clock.now() + duration);
                report.approvals += 1;
            }
            // Revoke by key
            5..=6 => {
                rig.engine.revoke_key(key.clone()).await.unwrap();
                model.insert(key.clone(), rig.clock.now());
                report.revokes += 1;
            }
            // Advance the clock
            7..=8 => {
                let jump = Duration::from_secs(rng.gen_range(1..600));
                rig.clock.advance(jump);
                report.clock_jumps += 1;
            }
            // Sweep; must never change visible state
            _ => {
                rig.store.sweep_expired().await.unwrap();
                report.sweeps += 1;
            }
        }

        // Check every key against the model
        let now = rig.clock.now();
        for key in &keys {
            let expected = model.get(key).is_some_and(|expiry| now < *expiry);
            let actual = rig.store.get_grant(key).await.unwrap().is_some();
            if expected != actual {
                report.violations += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_churn_upholds_store_invariants() {
        let report = run_churn(ChurnConfig::default()).await;

        assert_eq!(report.violations, 0, "store diverged from model: {report:?}");
        assert!(report.approvals > 0);
        assert!(report.revokes > 0);
    }

    #[tokio::test]
    async fn test_churn_is_deterministic_per_seed() {
        let first = run_churn(ChurnConfig::default()).await;
        let second = run_churn(ChurnConfig::default()).await;

        assert_eq!(first.approvals, second.approvals);
        assert_eq!(first.revokes, second.revokes);
    }
}
