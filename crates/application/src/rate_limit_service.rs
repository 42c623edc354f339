//! Sliding-window rate limiter with a block period after the window fills.
//!
//! Entries expire lazily: `check` and `record` interpret stale state
//! instead of deleting it, and a periodic [`RateLimiter::sweep`] reclaims
//! memory for identifiers that stopped arriving.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use butik_core::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

/// Outcome of an admission check. Checking never mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Attempts left in the current window (`max_requests` when the
    /// identifier is unseen or its window expired).
    pub remaining: u32,
    /// When allowed, time until the window resets; when denied, time until
    /// the block lifts.
    pub reset_in: Duration,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    first_request: DateTime<Utc>,
    last_request: DateTime<Utc>,
}

/// In-memory per-identifier rate limiter.
///
/// State lives in process memory only; a restart clears all counters.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
    max_requests: u32,
    window: Duration,
    block_duration: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_requests` per `window`, blocking for
    /// `block_duration` after the window fills.
    #[must_use]
    pub fn new(
        max_requests: u32,
        window: Duration,
        block_duration: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_requests,
            window,
            block_duration,
            clock,
        }
    }

    fn normalize(identifier: &str) -> String {
        identifier.trim().to_lowercase()
    }

    /// Reports whether `identifier` would be admitted right now.
    ///
    /// Pure with respect to counters: calling it any number of times yields
    /// the same answer until [`RateLimiter::record`] runs.
    pub fn check(&self, identifier: &str) -> AppResult<Admission> {
        let key = Self::normalize(identifier);
        let now = self.clock.now();
        let entries = self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("kunci rate limiter rusak: {error}")))?;

        let Some(entry) = entries.get(&key) else {
            return Ok(Admission {
                allowed: true,
                remaining: self.max_requests,
                reset_in: self.window,
            });
        };

        if entry.count >= self.max_requests {
            let since_last = now - entry.last_request;
            if since_last < self.block_duration {
                return Ok(Admission {
                    allowed: false,
                    remaining: 0,
                    reset_in: self.block_duration - since_last,
                });
            }
            // Block elapsed without new attempts: the identifier starts a
            // fresh window on its next recorded request.
            return Ok(Admission {
                allowed: true,
                remaining: self.max_requests,
                reset_in: self.window,
            });
        }

        // Strictly greater: a request landing exactly at the window edge
        // still belongs to the current window.
        let since_first = now - entry.first_request;
        if since_first > self.window {
            return Ok(Admission {
                allowed: true,
                remaining: self.max_requests,
                reset_in: self.window,
            });
        }

        Ok(Admission {
            allowed: true,
            remaining: self.max_requests - entry.count,
            reset_in: self.window - since_first,
        })
    }

    /// Counts one admitted request against `identifier`.
    pub fn record(&self, identifier: &str) -> AppResult<()> {
        let key = Self::normalize(identifier);
        let now = self.clock.now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("kunci rate limiter rusak: {error}")))?;

        let fresh = WindowEntry {
            count: 1,
            first_request: now,
            last_request: now,
        };

        match entries.get_mut(&key) {
            None => {
                entries.insert(key, fresh);
            }
            Some(entry) => {
                let window_expired = now - entry.first_request > self.window;
                let block_lifted = entry.count >= self.max_requests
                    && now - entry.last_request >= self.block_duration;
                if window_expired || block_lifted {
                    *entry = fresh;
                } else {
                    entry.count += 1;
                    entry.last_request = now;
                }
            }
        }
        Ok(())
    }

    /// Drops entries idle beyond the block duration. Returns how many were
    /// removed.
    pub fn sweep(&self) -> AppResult<usize> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("kunci rate limiter rusak: {error}")))?;
        let before = entries.len();
        entries.retain(|_, entry| now - entry.last_request <= self.block_duration);
        Ok(before - entries.len())
    }
}

/// Formats a wait as Indonesian "N jam M menit", dropping the hour part
/// when zero. Sub-minute waits round up to "1 menit".
#[must_use]
pub fn format_time_remaining(duration: Duration) -> String {
    let total_minutes = {
        let seconds = duration.num_seconds().max(0);
        (seconds + 59) / 60
    };
    let hours = total_minutes / 60;
    let minutes = (total_minutes % 60).max(if hours == 0 { 1 } else { 0 });
    if hours > 0 {
        format!("{hours} jam {minutes} menit")
    } else {
        format!("{minutes} menit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct TestClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl TestClock {
        fn at_start() -> Arc<Self> {
            let start = Utc
                .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
                .single()
                .unwrap_or_else(|| unreachable!());
            Arc::new(Self {
                now: Mutex::new(start),
            })
        }

        fn advance(&self, by: Duration) {
            if let Ok(mut now) = self.now.lock() {
                *now = *now + by;
            }
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
                .lock()
                .map(|now| *now)
                .unwrap_or_else(|_| unreachable!())
        }
    }

    fn limiter(clock: Arc<TestClock>) -> RateLimiter {
        RateLimiter::new(3, Duration::hours(1), Duration::hours(24), clock)
    }

    #[test]
    fn unseen_identifier_is_admitted_with_full_allowance() {
        let clock = TestClock::at_start();
        let limiter = limiter(clock);
        let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(admission.allowed);
        assert_eq!(admission.remaining, 3);
        assert_eq!(admission.reset_in, Duration::hours(1));
    }

    #[test]
    fn filling_the_window_blocks_for_the_block_duration() {
        let clock = TestClock::at_start();
        let limiter = limiter(Arc::clone(&clock));
        for _ in 0..3 {
            assert!(limiter.record("fp_abc").is_ok());
        }
        let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(!admission.allowed);
        assert_eq!(admission.remaining, 0);
        assert_eq!(admission.reset_in, Duration::hours(24));

        clock.advance(Duration::hours(23));
        let later = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(!later.allowed);
        assert_eq!(later.reset_in, Duration::hours(1));
    }

    #[test]
    fn check_does_not_consume_allowance() {
        let clock = TestClock::at_start();
        let limiter = limiter(clock);
        for _ in 0..10 {
            let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
            assert!(admission.allowed);
            assert_eq!(admission.remaining, 3);
        }
    }

    #[test]
    fn remaining_decreases_only_on_record() {
        let clock = TestClock::at_start();
        let limiter = limiter(clock);
        assert!(limiter.record("fp_abc").is_ok());
        assert!(limiter.record("fp_abc").is_ok());
        let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(admission.allowed);
        assert_eq!(admission.remaining, 1);
    }

    #[test]
    fn window_expiry_restores_the_full_allowance() {
        let clock = TestClock::at_start();
        let limiter = limiter(Arc::clone(&clock));
        assert!(limiter.record("fp_abc").is_ok());
        assert!(limiter.record("fp_abc").is_ok());

        // Exactly one window later the requests still count against it.
        clock.advance(Duration::hours(1));
        let at_edge = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(at_edge.allowed);
        assert_eq!(at_edge.remaining, 1);

        clock.advance(Duration::seconds(1));
        let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(admission.allowed);
        assert_eq!(admission.remaining, 3);

        // The next record starts a fresh window rather than extending the
        // stale one.
        assert!(limiter.record("fp_abc").is_ok());
        let after = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert_eq!(after.remaining, 2);
    }

    #[test]
    fn record_at_the_window_edge_extends_the_current_window() {
        let clock = TestClock::at_start();
        let limiter = limiter(Arc::clone(&clock));
        assert!(limiter.record("fp_abc").is_ok());
        assert!(limiter.record("fp_abc").is_ok());

        clock.advance(Duration::hours(1));
        assert!(limiter.record("fp_abc").is_ok());

        let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(!admission.allowed);
        assert_eq!(admission.remaining, 0);
    }

    #[test]
    fn block_expiry_admits_and_resets_on_next_record() {
        let clock = TestClock::at_start();
        let limiter = limiter(Arc::clone(&clock));
        for _ in 0..3 {
            assert!(limiter.record("fp_abc").is_ok());
        }
        clock.advance(Duration::hours(24));

        let admission = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(admission.allowed);
        assert_eq!(admission.remaining, 3);

        assert!(limiter.record("fp_abc").is_ok());
        let after = limiter.check("fp_abc").unwrap_or_else(|_| unreachable!());
        assert!(after.allowed);
        assert_eq!(after.remaining, 2);
    }

    #[test]
    fn identifiers_are_normalized_before_counting() {
        let clock = TestClock::at_start();
        let limiter = limiter(clock);
        assert!(limiter.record("  Budi@Example.ID ").is_ok());
        let admission = limiter
            .check("budi@example.id")
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(admission.remaining, 2);
    }

    #[test]
    fn identifiers_are_counted_independently() {
        let clock = TestClock::at_start();
        let limiter = limiter(clock);
        for _ in 0..3 {
            assert!(limiter.record("fp_aaa").is_ok());
        }
        let other = limiter.check("fp_bbb").unwrap_or_else(|_| unreachable!());
        assert!(other.allowed);
        assert_eq!(other.remaining, 3);
    }

    #[test]
    fn sweep_removes_only_long_idle_entries() {
        let clock = TestClock::at_start();
        let limiter = limiter(Arc::clone(&clock));
        assert!(limiter.record("fp_old").is_ok());
        clock.advance(Duration::hours(25));
        assert!(limiter.record("fp_new").is_ok());

        let removed = limiter.sweep().unwrap_or_else(|_| unreachable!());
        assert_eq!(removed, 1);

        // The surviving entry still counts.
        let admission = limiter.check("fp_new").unwrap_or_else(|_| unreachable!());
        assert_eq!(admission.remaining, 2);
    }

    #[test]
    fn wait_times_format_in_indonesian() {
        assert_eq!(
            format_time_remaining(Duration::minutes(150)),
            "2 jam 30 menit"
        );
        assert_eq!(format_time_remaining(Duration::minutes(45)), "45 menit");
        assert_eq!(format_time_remaining(Duration::seconds(20)), "1 menit");
        assert_eq!(format_time_remaining(Duration::hours(2)), "2 jam 0 menit");
    }
}
