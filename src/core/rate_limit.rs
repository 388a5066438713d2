//! Per-client token bucket rate limiting for the public API.
//!
//! Each client IP owns a bucket holding up to `burst` tokens that refills at
//! `requests_per_second`. A request spends one token; an empty bucket yields
//! the time until the next token is available. Buckets idle for longer than
//! the entry TTL are dropped by a background sweeper.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::config::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_seen: Instant,
}

impl TokenBucket {
    fn full(burst: u32, now: Instant) -> Self {
        Self {
            tokens: burst as f64,
            last_seen: now,
        }
    }

    fn try_consume(&mut self, config: &RateLimitConfig, now: Instant) -> RateLimitDecision {
        let elapsed = now.duration_since(self.last_seen).as_secs_f64();
        self.tokens = (self.tokens + elapsed * config.requests_per_second).min(config.burst as f64);
        self.last_seen = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            RateLimitDecision::Allowed
        } else {
            let missing = 1.0 - self.tokens;
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs_f64(missing / config.requests_per_second),
            }
        }
    }
}

pub struct IpRateLimiter {
    config: RateLimitConfig,
    buckets: RwLock<HashMap<IpAddr, TokenBucket>>,
}

impl IpRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitDecision {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::full(self.config.burst, now))
            .try_consume(&self.config, now)
    }

    /// Drops buckets not seen within the entry TTL, returns how many were removed
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.entry_ttl;
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_seen) <= ttl);
        before - buckets.len()
    }

    pub async fn tracked_clients(&self) -> usize {
        self.buckets.read().await.len()
    }

    /// Sweeps stale clients every `sweep_interval` until `shutdown` fires
    pub fn spawn_sweeper(
        self: Arc<Self>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let period = self.config.sweep_interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Rate limit sweeper stopped");
                        return;
                    }
                    _ = interval.tick() => {
                        let removed = self.sweep().await;
                        if removed > 0 {
                            tracing::debug!(removed, "Swept idle rate limit entries");
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn config(rps: f64, burst: u32) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: rps,
            burst,
            entry_ttl: Duration::from_secs(180),
            sweep_interval: Duration::from_secs(60),
        }
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_limited() {
        let limiter = IpRateLimiter::new(config(1.0, 3));

        for _ in 0..3 {
            assert_eq!(limiter.check(ip(1)).await, RateLimitDecision::Allowed);
        }

        match limiter.check(ip(1)).await {
            RateLimitDecision::Limited { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(1));
            }
            other => panic!("expected limit, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_refill_over_time() {
        let limiter = IpRateLimiter::new(config(2.0, 1));

        assert_eq!(limiter.check(ip(1)).await, RateLimitDecision::Allowed);
        assert!(matches!(
            limiter.check(ip(1)).await,
            RateLimitDecision::Limited { .. }
        ));

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(limiter.check(ip(1)).await, RateLimitDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_limited_independently() {
        let limiter = IpRateLimiter::new(config(1.0, 1));

        assert_eq!(limiter.check(ip(1)).await, RateLimitDecision::Allowed);
        assert!(matches!(
            limiter.check(ip(1)).await,
            RateLimitDecision::Limited { .. }
        ));
        assert_eq!(limiter.check(ip(2)).await, RateLimitDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_idle_clients() {
        let limiter = IpRateLimiter::new(config(1.0, 5));
        limiter.check(ip(1)).await;

        tokio::time::advance(Duration::from_secs(120)).await;
        limiter.check(ip(2)).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.sweep().await, 1);
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_until_cancelled() {
        let limiter = Arc::new(IpRateLimiter::new(config(1.0, 5)));
        limiter.check(ip(1)).await;

        let shutdown = CancellationToken::new();
        let handle = Arc::clone(&limiter).spawn_sweeper(shutdown.clone());

        tokio::time::sleep(Duration::from_secs(241)).await;
        assert_eq!(limiter.tracked_clients().await, 0);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
