//! Token bucket state for a single client.

use std::time::Instant;

/// Per-client rate-limiting state.
///
/// Tokens refill continuously at the configured rate up to `capacity`;
/// one token is consumed per admitted request. The caller supplies every
/// instant so the registry stays in control of the clock.
#[derive(Debug)]
pub struct ClientBucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl ClientBucket {
    /// Create a full bucket.
    pub fn new(capacity: u32, refill_per_sec: f64, now: Instant) -> Self {
        Self {
            tokens: capacity as f64,
            capacity: capacity as f64,
            refill_per_sec,
            last_refill: now,
            last_seen: now,
        }
    }

    /// Refill for the elapsed interval, then try to take one token.
    pub fn admit(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Record activity for idle eviction.
    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    #[cfg(test)]
    fn tokens(&self) -> f64 {
        self.tokens
    }
}
