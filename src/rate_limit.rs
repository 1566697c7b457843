use dashmap::DashMap;
use std::time::{Duration, Instant};

// Admission control keyed by client. Implementations decide where the state lives
pub trait RateLimiter: Send + Sync {
    fn admit(&self, key: &str) -> bool;

    // Number of keys currently tracked, if the store can tell
    fn tracked_keys(&self) -> usize {
        0
    }
}

// Rate bucket - remaining allowance per IP/key
#[derive(Debug, Clone, Copy)]
pub struct RateBucket {
    pub tokens: u32,
    pub last_refill_at: Instant,
}

/// Process-local token bucket limiter.
///
/// Each key gets `capacity` tokens that refill continuously, `capacity` tokens
/// per `window`. Buckets are created lazily and never evicted.
pub struct TokenBucketLimiter {
    buckets: DashMap<String, RateBucket>,
    capacity: u32,
    window: Duration,
}

impl TokenBucketLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            window,
        }
    }

    pub fn admit_at(&self, key: &str, now: Instant) -> bool {
        // entry() holds the shard write lock until the guard drops,
        // so the whole refill/check/decrement is atomic per key
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert(RateBucket {
                tokens: self.capacity,
                last_refill_at: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last_refill_at);
        let refill = self.refill_amount(elapsed);
        bucket.tokens = bucket.tokens.saturating_add(refill).min(self.capacity);
        // clock resets even when refill rounds down to zero
        bucket.last_refill_at = bucket.last_refill_at.max(now);

        if bucket.tokens == 0 {
            return false;
        }

        bucket.tokens -= 1;
        true
    }

    fn refill_amount(&self, elapsed: Duration) -> u32 {
        let window_ms = self.window.as_millis();
        if window_ms == 0 {
            return self.capacity;
        }
        let amount = elapsed.as_millis() * u128::from(self.capacity) / window_ms;
        u32::try_from(amount).unwrap_or(u32::MAX)
    }
}

impl RateLimiter for TokenBucketLimiter {
    fn admit(&self, key: &str) -> bool {
        self.admit_at(key, Instant::now())
    }

    fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WINDOW: Duration = Duration::from_secs(60);

    impl TokenBucketLimiter {
        fn tokens(&self, key: &str) -> Option<u32> {
            self.buckets.get(key).map(|b| b.tokens)
        }
    }

    #[test]
    fn eleventh_request_in_window_is_rejected() {
        let limiter = TokenBucketLimiter::new(10, WINDOW);
        let start = Instant::now();

        for i in 0..10 {
            let now = start + Duration::from_millis(i * 100);
            assert!(limiter.admit_at("1.2.3.4", now), "request {} should pass", i + 1);
        }
        assert!(!limiter.admit_at("1.2.3.4", start + Duration::from_secs(1)));
        assert_eq!(limiter.tokens("1.2.3.4"), Some(0));
    }

    #[test]
    fn full_window_restores_capacity_without_overflow() {
        let limiter = TokenBucketLimiter::new(10, WINDOW);
        let start = Instant::now();

        for _ in 0..10 {
            assert!(limiter.admit_at("k", start));
        }
        assert!(!limiter.admit_at("k", start));

        // several windows later the bucket still holds at most capacity
        let later = start + WINDOW * 3;
        assert!(limiter.admit_at("k", later));
        assert_eq!(limiter.tokens("k"), Some(9));
    }

    #[test]
    fn refill_is_proportional() {
        let limiter = TokenBucketLimiter::new(10, WINDOW);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.admit_at("k", start);
        }

        // 6s is exactly one token at 10 per 60s
        assert!(limiter.admit_at("k", start + Duration::from_secs(6)));
        assert!(!limiter.admit_at("k", start + Duration::from_secs(6)));
    }

    #[test]
    fn refill_clock_resets_when_amount_rounds_to_zero() {
        let limiter = TokenBucketLimiter::new(10, WINDOW);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.admit_at("k", start);
        }

        // two 4s gaps would add up to a token, but each call resets the clock
        assert!(!limiter.admit_at("k", start + Duration::from_secs(4)));
        assert!(!limiter.admit_at("k", start + Duration::from_secs(8)));
    }

    #[test]
    fn unknown_key_starts_at_full_capacity() {
        let limiter = TokenBucketLimiter::new(10, WINDOW);
        assert_eq!(limiter.tokens("fresh"), None);
        assert!(limiter.admit("fresh"));
        assert_eq!(limiter.tokens("fresh"), Some(9));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = TokenBucketLimiter::new(2, WINDOW);
        let now = Instant::now();
        assert!(limiter.admit_at("a", now));
        assert!(limiter.admit_at("a", now));
        assert!(!limiter.admit_at("a", now));
        assert!(limiter.admit_at("b", now));
    }

    #[test]
    fn clock_going_backwards_does_not_rewind_bucket() {
        let limiter = TokenBucketLimiter::new(10, WINDOW);
        let start = Instant::now() + Duration::from_secs(10);
        limiter.admit_at("k", start);
        limiter.admit_at("k", start - Duration::from_secs(5));

        let last = limiter.buckets.get("k").unwrap().last_refill_at;
        assert_eq!(last, start);
    }

    #[test]
    fn concurrent_admits_never_exceed_capacity() {
        let limiter = Arc::new(TokenBucketLimiter::new(10, Duration::from_secs(3600)));
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if limiter.admit("shared") {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 10);
    }
}
