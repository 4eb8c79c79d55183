//! Token bucket rate limiting for outbound adapter requests.

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use super::SearchError;

/// Token bucket for a single backend.
///
/// Tokens are added at a constant rate and consumed per request. The bucket
/// starts full, allowing an initial burst up to the capacity.
#[derive(Debug)]
pub struct TokenBucket {
    /// Max tokens (= requests per minute).
    capacity: f32,
    tokens: f32,
    /// Tokens added per second.
    refill_rate: f32,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute.max(1) as f32;
        Self {
            capacity,
            tokens: capacity,
            refill_rate: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// Take one token, or return how long until one is available.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Err(Duration::from_secs_f32(tokens_needed / self.refill_rate))
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f32();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Rate limiter owned by one adapter.
#[derive(Debug)]
pub struct AdapterRateLimiter {
    source: String,
    bucket: Mutex<TokenBucket>,
}

impl AdapterRateLimiter {
    pub fn new(source: &str, requests_per_minute: u32) -> Self {
        Self {
            source: source.to_string(),
            bucket: Mutex::new(TokenBucket::new(requests_per_minute)),
        }
    }

    /// Acquire a request slot or fail with `SearchError::RateLimited`.
    pub async fn try_acquire(&self) -> Result<(), SearchError> {
        self.bucket
            .lock()
            .await
            .try_acquire()
            .map_err(|wait| SearchError::RateLimited {
                source_name: self.source.clone(),
                retry_after_ms: wait.as_millis() as u64,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bucket_starts_full() {
        let mut bucket = TokenBucket::new(3);
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::new(60); // 1 token/sec
        for _ in 0..60 {
            bucket.try_acquire().unwrap();
        }
        let wait = bucket.try_acquire().unwrap_err();
        assert!(wait <= Duration::from_secs(1));

        tokio::time::advance(Duration::from_millis(1100)).await;
        assert!(bucket.try_acquire().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_adapter_limiter_reports_source() {
        let limiter = AdapterRateLimiter::new("jackett", 1);
        limiter.try_acquire().await.unwrap();

        match limiter.try_acquire().await {
            Err(SearchError::RateLimited {
                source_name,
                retry_after_ms,
            }) => {
                assert_eq!(source_name, "jackett");
                assert!(retry_after_ms > 0);
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }
}
