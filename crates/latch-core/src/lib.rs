//! Latch Core - Fundamental types for timed access grants
//!
//! This crate defines the types shared by every Latch component:
//! - Identifiers (Subject, Feature, FeatureId, AccessKey, SubmissionId)
//! - Wall-clock time primitives (Timestamp, Clock)
//! - Plan tiers (named duration buckets)
//! - Grant and Submission models
//! - Subscription events
//! - Error taxonomy

pub mod id;
pub mod time;
pub mod tier;
pub mod grant;
pub mod submission;
pub mod event;
pub mod error;

pub use id::*;
pub use time::*;
pub use tier::*;
pub use grant::*;
pub use submission::*;
pub use event::*;
pub use error::*;
