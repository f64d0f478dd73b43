//! Wall-clock time primitives
//!
//! Grants expire against real wall-clock time, so timestamps are absolute
//! milliseconds since the Unix epoch rather than a session-relative clock.
//! The `Clock` handle abstracts over the system clock and a manually
//! advanced test clock; expiry logic must never read the OS clock directly.

use std::ops::{Add, Sub};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Absolute wall-clock instant, milliseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_add(duration.as_millis() as i64))
    }

    #[inline]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_sub(duration.as_millis() as i64))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn sub(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0 - rhs.as_millis() as i64)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    /// Saturating difference: an earlier minus a later instant is zero
    #[inline]
    fn sub(self, rhs: Timestamp) -> Self::Output {
        let diff = self.0 - rhs.0;
        if diff >= 0 {
            Duration::from_millis(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({}ms)", self.0)
    }
}

/// Clock handle - system wall clock or a manually advanced test clock
///
/// Cloning a manual clock shares the underlying cell, so a test can hold one
/// handle and advance time under components holding the other.
#[derive(Clone)]
pub enum Clock {
    System,
    Manual(Arc<Mutex<Timestamp>>),
}

impl Clock {
    /// Clock backed by the OS wall clock
    pub fn system() -> Self {
        Clock::System
    }

    /// Manually advanced clock starting at the given instant
    pub fn manual(start: Timestamp) -> Self {
        Clock::Manual(Arc::new(Mutex::new(start)))
    }

    /// Current instant
    pub fn now(&self) -> Timestamp {
        match self {
            Clock::System => {
                let since_epoch = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::ZERO);
                Timestamp(since_epoch.as_millis() as i64)
            }
            Clock::Manual(cell) => *cell.lock(),
        }
    }

    /// Advance a manual clock; has no effect on the system clock
    pub fn advance(&self, dt: Duration) {
        if let Clock::Manual(cell) = self {
            let mut now = cell.lock();
            *now = now.saturating_add(dt);
        }
    }

    /// Jump a manual clock to an instant; only forward moves are applied
    pub fn set(&self, target: Timestamp) {
        if let Clock::Manual(cell) = self {
            let mut now = cell.lock();
            if target > *now {
                *now = target;
            }
        }
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clock::System => write!(f, "Clock(system)"),
            Clock::Manual(cell) => write!(f, "Clock(manual, {:?})", *cell.lock()),
        }
    }
}
