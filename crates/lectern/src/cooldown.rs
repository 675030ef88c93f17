//! Per-invoker cooldowns.

use lectern_core::{Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};
use uuid::Uuid;

/// Identity of one rate-limited action
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    /// Invoker id
    pub invoker: Uuid,
    /// Root name of the command
    pub command: String,
    /// Route path (`""` for the default route)
    pub route: String,
}

impl CooldownKey {
    /// Build a key
    pub fn new(invoker: Uuid, command: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            invoker,
            command: command.into(),
            route: route.into(),
        }
    }
}

/// Longest cooldown a route may declare
pub const MAX_COOLDOWN: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Minimum time between full sweeps of expired entries
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CooldownState {
    expiries: HashMap<CooldownKey, Instant>,
    next_sweep: Instant,
}

impl CooldownState {
    fn active(&self, key: &CooldownKey, now: Instant) -> Option<Duration> {
        self.expiries
            .get(key)
            .and_then(|expiry| expiry.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    /// Drop every expired entry once per [`SWEEP_INTERVAL`]
    fn maybe_sweep(&mut self, now: Instant) {
        if now < self.next_sweep {
            return;
        }
        let before = self.expiries.len();
        self.expiries.retain(|_, expiry| *expiry > now);
        self.next_sweep = now.checked_add(SWEEP_INTERVAL).unwrap_or(now);
        let removed = before - self.expiries.len();
        if removed > 0 {
            trace!(removed, remaining = self.expiries.len(), "Swept expired cooldowns");
        }
    }

    fn arm(&mut self, key: CooldownKey, now: Instant, duration: Duration) {
        match now.checked_add(duration.min(MAX_COOLDOWN)) {
            Some(expiry) => {
                self.expiries.insert(key, expiry);
            }
            None => {
                warn!(invoker = %key.invoker, command = %key.command, ?duration, "Cooldown expiry out of clock range, not armed");
            }
        }
    }
}

/// Expiry instants per [`CooldownKey`], measured on an injected clock.
///
/// Durations are capped at [`MAX_COOLDOWN`]. Expired entries are dropped
/// when looked up and by a sweep that runs at most once per
/// [`SWEEP_INTERVAL`], so the map only holds live cooldowns plus whatever
/// expired since the last sweep.
#[derive(Debug)]
pub struct CooldownService {
    clock: Arc<dyn Clock>,
    state: Mutex<CooldownState>,
}

impl Default for CooldownService {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl CooldownService {
    /// Service reading time from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            state: Mutex::new(CooldownState {
                expiries: HashMap::new(),
                next_sweep: now.checked_add(SWEEP_INTERVAL).unwrap_or(now),
            }),
        }
    }

    /// Time left before `key` may be used again
    #[must_use]
    pub fn remaining(&self, key: &CooldownKey) -> Option<Duration> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let left = state.active(key, now);
        if left.is_none() {
            state.expiries.remove(key);
        }
        left
    }

    /// Start (or restart) a cooldown
    pub fn arm(&self, key: CooldownKey, duration: Duration) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.maybe_sweep(now);
        state.arm(key, now, duration);
    }

    /// Check and arm in one step.
    ///
    /// Returns the remaining time if the cooldown is still active; otherwise
    /// arms it and returns `Ok`.
    pub fn try_acquire(&self, key: CooldownKey, duration: Duration) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if let Some(left) = state.active(&key, now) {
            return Err(left);
        }
        state.maybe_sweep(now);
        trace!(invoker = %key.invoker, command = %key.command, route = %key.route, ?duration, "Armed cooldown");
        state.arm(key, now, duration);
        Ok(())
    }

    /// Forget every cooldown of one invoker
    pub fn clear(&self, invoker: Uuid) {
        self.state
            .lock()
            .expiries
            .retain(|key, _| key.invoker != invoker);
    }

    /// Drop expired entries now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let before = state.expiries.len();
        state.expiries.retain(|_, expiry| *expiry > now);
        before - state.expiries.len()
    }

    /// Number of tracked entries, including any expired since the last sweep
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().expiries.len()
    }

    /// Whether nothing is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_testkit::ManualClock;

    fn key(invoker: Uuid) -> CooldownKey {
        CooldownKey::new(invoker, "config", "reload")
    }

    #[test]
    fn test_cooldown_expires_with_clock() {
        let clock = Arc::new(ManualClock::new());
        let cooldowns = CooldownService::new(clock.clone());
        let alice = Uuid::new_v4();

        assert_eq!(cooldowns.try_acquire(key(alice), Duration::from_secs(10)), Ok(()));
        clock.advance(Duration::from_secs(4));
        assert_eq!(
            cooldowns.try_acquire(key(alice), Duration::from_secs(10)),
            Err(Duration::from_secs(6))
        );
        assert_eq!(cooldowns.remaining(&key(alice)), Some(Duration::from_secs(6)));

        clock.advance(Duration::from_secs(6));
        assert_eq!(cooldowns.remaining(&key(alice)), None);
        assert_eq!(cooldowns.try_acquire(key(alice), Duration::from_secs(10)), Ok(()));
    }

    #[test]
    fn test_keys_are_independent() {
        let cooldowns = CooldownService::new(Arc::new(ManualClock::new()));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        cooldowns.arm(key(alice), Duration::from_secs(5));
        assert!(cooldowns.remaining(&key(bob)).is_none());
        assert!(cooldowns
            .remaining(&CooldownKey::new(alice, "config", ""))
            .is_none());
    }

    #[test]
    fn test_clear_and_purge() {
        let clock = Arc::new(ManualClock::new());
        let cooldowns = CooldownService::new(clock.clone());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        cooldowns.arm(key(alice), Duration::from_secs(5));
        cooldowns.arm(key(bob), Duration::from_secs(50));
        cooldowns.clear(alice);
        assert_eq!(cooldowns.len(), 1);

        cooldowns.arm(key(alice), Duration::from_secs(5));
        clock.advance(Duration::from_secs(5));
        assert_eq!(cooldowns.purge_expired(), 1);
        assert!(cooldowns.remaining(&key(bob)).is_some());
    }

    #[test]
    fn test_huge_cooldown_is_capped() {
        let clock = Arc::new(ManualClock::new());
        let cooldowns = CooldownService::new(clock.clone());
        let alice = Uuid::new_v4();

        assert_eq!(
            cooldowns.try_acquire(key(alice), Duration::from_secs(u64::MAX)),
            Ok(())
        );
        assert_eq!(cooldowns.remaining(&key(alice)), Some(MAX_COOLDOWN));
        assert_eq!(
            cooldowns.try_acquire(key(alice), Duration::MAX),
            Err(MAX_COOLDOWN)
        );

        cooldowns.arm(key(alice), Duration::MAX);
        clock.advance(MAX_COOLDOWN);
        assert_eq!(cooldowns.remaining(&key(alice)), None);
    }

    #[test]
    fn test_expired_entries_are_swept() {
        let clock = Arc::new(ManualClock::new());
        let cooldowns = CooldownService::new(clock.clone());

        for _ in 0..1000 {
            assert!(cooldowns
                .try_acquire(key(Uuid::new_v4()), Duration::from_secs(1))
                .is_ok());
        }
        assert_eq!(cooldowns.len(), 1000);

        clock.advance(SWEEP_INTERVAL);
        let alice = Uuid::new_v4();
        assert!(cooldowns.try_acquire(key(alice), Duration::from_secs(1)).is_ok());
        assert_eq!(cooldowns.len(), 1);
    }

    #[test]
    fn test_lookup_drops_expired_key() {
        let clock = Arc::new(ManualClock::new());
        let cooldowns = CooldownService::new(clock.clone());
        let alice = Uuid::new_v4();

        cooldowns.arm(key(alice), Duration::from_secs(2));
        clock.advance(Duration::from_secs(3));
        assert_eq!(cooldowns.len(), 1);
        assert_eq!(cooldowns.remaining(&key(alice)), None);
        assert!(cooldowns.is_empty());
    }
}
