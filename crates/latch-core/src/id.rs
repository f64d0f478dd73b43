//! Identity types for Latch
//!
//! Subjects are end-user identities (email addresses). Features name a
//! content-module kind ("video", "podcast", "pdf") and feature ids name the
//! gated instance (a playlist id, a notebook id). Callers resolve
//! human-readable aliases to canonical ids before these types are built.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subject identity - the end user a grant or submission is issued against
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(value: impl Into<String>) -> Self {
        Subject(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject({})", self.0)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feature kind - a content-module classification ("video", "podcast", "pdf")
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feature(String);

impl Feature {
    pub fn new(value: impl Into<String>) -> Self {
        Feature(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Feature({})", self.0)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feature instance id - the specific gated instance within a feature kind
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(value: impl Into<String>) -> Self {
        FeatureId(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite grant key - at most one active grant exists per key
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessKey {
    pub subject: Subject,
    pub feature: Feature,
    pub feature_id: FeatureId,
}

impl AccessKey {
    pub fn new(subject: Subject, feature: Feature, feature_id: FeatureId) -> Self {
        AccessKey {
            subject,
            feature,
            feature_id,
        }
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key({}:{}@{})",
            self.feature, self.feature_id, self.subject
        )
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.feature, self.feature_id, self.subject)
    }
}

/// Submission identity - unique within the submission log
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub u64);

impl SubmissionId {
    #[inline]
    pub fn new(id: u64) -> Self {
        SubmissionId(id)
    }
}

impl fmt::Debug for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_emptiness() {
        assert!(Subject::new("").is_empty());
        assert!(Subject::new("   ").is_empty());
        assert!(!Subject::new("a@example.com").is_empty());
    }

    #[test]
    fn test_access_key_display() {
        let key = AccessKey::new(
            Subject::new("a@example.com"),
            Feature::new("video"),
            FeatureId::new("playlist1"),
        );
        assert_eq!(key.to_string(), "video:playlist1@a@example.com");
    }

    #[test]
    fn test_key_equality_is_composite() {
        let a = AccessKey::new(
            Subject::new("a@example.com"),
            Feature::new("video"),
            FeatureId::new("p1"),
        );
        let b = AccessKey::new(
            Subject::new("a@example.com"),
            Feature::new("pdf"),
            FeatureId::new("p1"),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_subject_serde_transparent() {
        let subject = Subject::new("a@example.com");
        let json = serde_json::to_string(&subject).unwrap();
        assert_eq!(json, "\"a@example.com\"");
    }
}
