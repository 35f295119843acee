//! Retry/backoff state machine for upstream resolution.
//!
//! Pure bookkeeping; the resolver owns the timers. Keeping the schedule here
//! means it can be checked without sleeping.

use std::time::{Duration, Instant};

/// Hard ceiling for a single backoff wait, regardless of configuration.
pub const BACKOFF_CEILING: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first one. Always >= 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        let max_backoff = Duration::from_millis(max_backoff_ms).min(BACKOFF_CEILING);
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(initial_backoff_ms).min(max_backoff),
            max_backoff,
        }
    }

    /// Wait before retry number `retry` (1-based): initial * 2^(retry-1), capped.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(31);
        self.initial_backoff
            .checked_mul(1u32 << shift)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Every wait a fully failing sequence would observe, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|r| self.backoff_for(r)).collect()
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Sleep `backoff`, then make attempt number `next_attempt`.
    Retry { next_attempt: u32, backoff: Duration },
    /// Attempt budget spent.
    Exhausted { attempts: u32 },
    /// The wait would run past the query deadline.
    DeadlineReached { attempts: u32 },
}

/// Per-sequence retry bookkeeping. Created for one resolution, then dropped.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
    next_backoff: Duration,
    deadline: Option<Instant>,
}

impl RetryState {
    pub fn new(policy: RetryPolicy, deadline: Option<Instant>) -> Self {
        Self {
            policy,
            attempts: 0,
            next_backoff: policy.backoff_for(1),
            deadline,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn next_backoff(&self) -> Duration {
        self.next_backoff
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Claims the next attempt. `None` once the budget is spent, so the
    /// attempt counter can never pass `max_attempts`.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    pub fn on_failure(&mut self, now: Instant) -> RetryStep {
        if self.attempts >= self.policy.max_attempts {
            return RetryStep::Exhausted {
                attempts: self.attempts,
            };
        }

        let backoff = self.next_backoff;
        if let Some(deadline) = self.deadline {
            if now + backoff >= deadline {
                return RetryStep::DeadlineReached {
                    attempts: self.attempts,
                };
            }
        }

        self.next_backoff = (backoff * 2).min(self.policy.max_backoff);
        RetryStep::Retry {
            next_attempt: self.attempts + 1,
            backoff,
        }
    }
}
