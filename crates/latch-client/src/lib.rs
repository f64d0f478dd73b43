//! Latch Client - access cache and reconciler for content viewers
//!
//! One `AccessCache` serves every content viewer in a session (video,
//! podcast, PDF gallery), replacing per-content-type copies of the same
//! caching logic. The cache is sans-I/O: the embedding session drives it
//! with subscription events, fetch results, and clock readings, and drains
//! the queues of keys that need a server round-trip.
//!
//! Driver loop:
//! 1. `decision()` per visible feature; `Unknown` means fetch
//! 2. feed fetch results back through `complete_fetch()`
//! 3. pump subscription events through `observe_event()`, then fetch and
//!    confirm everything in `take_confirmations()`
//! 4. arm one timer for `next_expiry()`; on fire call `on_expiry()` and
//!    drain `take_reconcile_queue()`
//! 5. on window refocus call `on_refocus()` and drain the queue again

pub mod cache;
pub mod preview;

pub use cache::*;
pub use preview::*;
