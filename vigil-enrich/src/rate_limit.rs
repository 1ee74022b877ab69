//! Rolling-window rate limiter for NVD requests.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Grants at most `max_permits` permits per rolling `window`.
///
/// The deque holds the grant instants still inside the window; the decision
/// function is pure in `now`, so the policy can be tested without waiting.
#[derive(Debug)]
pub struct RollingWindowLimiter {
    max_permits: usize,
    window: Duration,
    grants: VecDeque<Instant>,
}

impl RollingWindowLimiter {
    pub fn new(max_permits: usize, window: Duration) -> Self {
        RollingWindowLimiter {
            max_permits: max_permits.max(1),
            window,
            grants: VecDeque::new(),
        }
    }

    /// Try to take a permit at `now`. On a full window, returns how long
    /// until the oldest grant leaves it.
    pub fn try_acquire_at(&mut self, now: Instant) -> Result<(), Duration> {
        while let Some(&front) = self.grants.front() {
            if now.duration_since(front) >= self.window {
                self.grants.pop_front();
            } else {
                break;
            }
        }
        if self.grants.len() < self.max_permits {
            self.grants.push_back(now);
            return Ok(());
        }
        // the window is full, so a front grant exists
        let oldest = self.grants.front().copied().unwrap_or(now);
        Err(self.window - now.duration_since(oldest))
    }
}
