//! Latch Store - durable records behind the access-grant pipeline
//!
//! Two collections live here:
//! - the grant map, keyed by (subject, feature, featureId), with lazy expiry
//!   on read and a physical sweep as an optimization
//! - the submission log, retained until an administrator deletes rows
//!
//! Every operation is async: callers treat the store as network-attached
//! I/O and must await it, even though this engine keeps state in memory.

pub mod grants;
pub mod submissions;

pub use grants::*;
pub use submissions::*;
