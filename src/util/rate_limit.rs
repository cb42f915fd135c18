//! Sliding-window rate limiting keyed by operation name.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};

/// In-process sliding-window limiter.
///
/// Each operation key gets an independent window, so a burst against one
/// CRM never starves the others. Rejections happen before the attempt is
/// recorded; a rejected call does not shrink the caller's remaining quota.
pub struct RateLimiter {
    max_requests: usize,
    interval: Duration,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, interval: Duration) -> Self {
        Self {
            max_requests,
            interval,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one attempt for `operation`.
    ///
    /// Fails with [`Error::RateLimited`] carrying the wait until the oldest
    /// recorded attempt ages out of the window.
    pub fn check(&self, operation: &str) -> Result<()> {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");
        let window = windows.entry(operation.to_string()).or_default();

        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) > self.interval {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.max_requests {
            let retry_after_ms = window
                .front()
                .map(|oldest| {
                    self.interval
                        .saturating_sub(now.duration_since(*oldest))
                        .as_millis() as u64
                });
            debug!(operation, limit = self.max_requests, "rate limit exceeded");
            return Err(Error::RateLimited { retry_after_ms });
        }

        window.push_back(now);
        Ok(())
    }
}
