//! Clock abstraction.
//!
//! Cooldowns read time through [`Clock`] so tests can drive it by hand.

use std::fmt;
use std::time::Instant;

/// Source of monotonic time
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
