//! Per-client rate limiting.
//!
//! A sliding-window limiter that tracks request timestamps per client and
//! denies requests once the window is full, reporting how long the caller
//! has to wait for the next free slot.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// Sliding-window rate limiter keyed by client id.
#[derive(Debug)]
pub struct RateLimiter {
    /// Whether limiting is active at all.
    enabled: bool,
    /// Maximum requests allowed within one window.
    max_requests: usize,
    /// Length of the sliding window.
    window: Duration,
    /// Request timestamps per client, oldest first.
    clients: HashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter from configuration.
    #[must_use]
    pub fn new(config: &LimitsConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            clients: HashMap::new(),
        }
    }

    /// Check whether the client may make a request now.
    ///
    /// Expired timestamps are dropped first. If the window still has room
    /// the request is recorded and allowed; otherwise nothing is recorded
    /// and the denial reports the seconds until the oldest entry expires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RateLimited`] when the client has exhausted the window.
    pub fn check(&mut self, client: &str) -> Result<()> {
        if !self.enabled || self.max_requests == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let window = self.window;
        let timestamps = self.clients.entry(client.to_string()).or_default();

        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            // The front survived the prune, so some of the window remains.
            let remaining = timestamps
                .front()
                .map_or(window, |oldest| window - now.duration_since(*oldest));
            let retry_after_secs =
                remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);

            debug!(
                "Rate limit reached for client {} ({} requests in window)",
                client,
                timestamps.len()
            );
            return Err(Error::RateLimited { retry_after_secs });
        }

        timestamps.push_back(now);
        Ok(())
    }

    /// Forget all recorded requests for a client.
    pub fn reset(&mut self, client: &str) {
        self.clients.remove(client);
    }

    /// Drop clients whose every recorded request has expired.
    ///
    /// Keeps the map from growing without bound when many one-off clients
    /// come and go.
    pub fn sweep(&mut self) {
        let now = Instant::now();
        let window = self.window;
        self.clients
            .retain(|_, timestamps| match timestamps.back() {
                Some(latest) => now.duration_since(*latest) < window,
                None => false,
            });
    }

    /// Number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}
