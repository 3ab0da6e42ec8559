//! Per-client bucket registry with idle eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::lifecycle::Shutdown;
use crate::limiter::bucket::ClientBucket;
use crate::limiter::clock::{Clock, SystemClock};

/// Bucket parameters applied to every new client.
#[derive(Debug, Clone, Copy)]
pub struct LimitPolicy {
    /// Sustained request rate.
    pub requests_per_second: f64,
    /// Burst size (bucket capacity).
    pub burst: u32,
}

/// Maps client keys to their rate-limiting buckets.
///
/// All access goes through one mutex: resolve-and-admit and the
/// background sweep both mutate the table, and a single lock acquisition
/// keeps every bucket update linearizable per client.
pub struct ClientRegistry {
    clients: Mutex<HashMap<String, ClientBucket>>,
    policy: LimitPolicy,
    clock: Arc<dyn Clock>,
}

impl ClientRegistry {
    pub fn new(policy: LimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: LimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            policy,
            clock,
        }
    }

    /// Resolve the bucket for `key`, creating a full one if the client is
    /// new, mark it seen, and run one admission check. The whole sequence
    /// holds the lock so concurrent requests from the same client observe
    /// consistent bucket state.
    pub fn admit(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut clients = self.clients.lock().expect("client registry mutex poisoned");
        let bucket = clients.entry(key.to_string()).or_insert_with(|| {
            ClientBucket::new(self.policy.burst, self.policy.requests_per_second, now)
        });
        bucket.touch(now);
        bucket.admit(now)
    }

    /// Drop every bucket idle for longer than `idle_threshold`.
    pub fn sweep(&self, idle_threshold: Duration) {
        let now = self.clock.now();
        let mut clients = self.clients.lock().expect("client registry mutex poisoned");
        let before = clients.len();
        clients.retain(|_, bucket| now.saturating_duration_since(bucket.last_seen()) <= idle_threshold);

        let evicted = before - clients.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = clients.len(), "Evicted idle rate-limit buckets");
        }
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.clients.lock().expect("client registry mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the eviction sweeper. It runs until the shutdown signal
    /// fires, so tests that build a gate do not leak a task each.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        idle_threshold: Duration,
        shutdown: &Shutdown,
    ) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let mut shutdown = shutdown.handle();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => registry.sweep(idle_threshold),
                    _ = shutdown.recv() => {
                        tracing::debug!("Registry sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    fn policy() -> LimitPolicy {
        LimitPolicy {
            requests_per_second: 1.0,
            burst: 2,
        }
    }

    #[test]
    fn admits_per_client_burst() {
        let registry = ClientRegistry::new(policy());

        assert!(registry.admit("10.0.0.1"));
        assert!(registry.admit("10.0.0.1"));
        assert!(!registry.admit("10.0.0.1"));

        // Another client gets its own bucket.
        assert!(registry.admit("10.0.0.2"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn sweep_evicts_idle_clients_only() {
        let clock = ManualClock::new();
        let registry = ClientRegistry::with_clock(policy(), clock.clone());

        assert!(registry.admit("idle"));
        clock.advance(Duration::from_secs(120));
        assert!(registry.admit("fresh"));
        clock.advance(Duration::from_secs(120));

        // "idle" was last seen 240s ago, "fresh" 120s ago.
        registry.sweep(Duration::from_secs(180));
        assert_eq!(registry.len(), 1);
        assert!(registry.admit("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_on_ticks_and_stops_on_shutdown() {
        let clock = ManualClock::new();
        let registry = Arc::new(ClientRegistry::with_clock(policy(), clock.clone()));
        let shutdown = Shutdown::new();

        assert!(registry.admit("10.0.0.1"));
        let handle = registry.spawn_sweeper(
            Duration::from_secs(60),
            Duration::from_secs(180),
            &shutdown,
        );

        // Idle past the threshold, then let a tick fire.
        clock.advance(Duration::from_secs(240));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(registry.is_empty());

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[test]
    fn evicted_client_restarts_with_full_capacity() {
        let clock = ManualClock::new();
        let registry = ClientRegistry::with_clock(policy(), clock.clone());

        // Drain the bucket, then let it go idle past the threshold.
        assert!(registry.admit("10.0.0.1"));
        assert!(registry.admit("10.0.0.1"));
        assert!(!registry.admit("10.0.0.1"));

        clock.advance(Duration::from_secs(240));
        registry.sweep(Duration::from_secs(180));
        assert!(registry.is_empty());

        // No memory of prior consumption: the full burst is available.
        assert!(registry.admit("10.0.0.1"));
        assert!(registry.admit("10.0.0.1"));
    }
}
