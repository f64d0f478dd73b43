//! Latch Channel - live propagation of grant/revoke events
//!
//! This crate provides:
//! - a per-subject fan-out hub over bounded queues
//! - heartbeats for idle-connection liveness
//! - pruning of connections whose transport has gone away
//!
//! Delivery is best-effort and at-least-once toward live connections. The
//! channel is a latency optimization, never a correctness dependency: a
//! client that misses an event recovers by re-querying the access store.

pub mod hub;
pub mod heartbeat;

pub use hub::*;
pub use heartbeat::*;
