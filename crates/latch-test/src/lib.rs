//! Latch Test Harness - end-to-end validation of the grant pipeline
//!
//! This crate provides:
//! - an in-process rig wiring store + engine + hub + manual clock
//! - a simulated content viewer driving the client cache
//! - a seeded churn fuzzer checking store invariants under random
//!   operation interleavings
//! - scenario suites covering the full submit/approve/propagate/expire flow

pub mod harness;
pub mod churn;
pub mod scenario;

pub use harness::*;
pub use churn::*;
