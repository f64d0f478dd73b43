//! End-to-end scenario suites
//!
//! Each scenario walks the full pipeline the way production traffic does:
//! intake over the engine, admin approval, propagation through the hub,
//! cache reconciliation on a simulated viewer, and expiry on the shared
//! manual clock.
