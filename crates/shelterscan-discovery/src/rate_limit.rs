//! Request pacing and retry utilities for the provider clients.
//!
//! [`RateLimitedQueue`] serializes a batch of sub-queries with a fixed pause
//! between items, which is how the unauthenticated text-search service's
//! rate limit is honoured. [`retry_with_backoff`] retries idempotent GETs on
//! transient failures.

use std::future::Future;
use std::time::Duration;

use crate::error::DiscoveryError;

/// Runs items one at a time, sleeping `inter_item_delay` between them.
///
/// Items are never started concurrently; the next item starts only after the
/// previous one finished and the delay elapsed. No delay precedes the first
/// item or follows the last.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitedQueue {
    inter_item_delay: Duration,
}

impl RateLimitedQueue {
    #[must_use]
    pub fn new(inter_item_delay: Duration) -> Self {
        Self { inter_item_delay }
    }

    #[must_use]
    pub fn inter_item_delay(&self) -> Duration {
        self.inter_item_delay
    }

    /// Applies `operation` to each item in order and collects the outputs.
    pub async fn run<I, T, F, Fut>(&self, items: I, mut operation: F) -> Vec<T>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut outputs = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 && !self.inter_item_delay.is_zero() {
                tokio::time::sleep(self.inter_item_delay).await;
            }
            outputs.push(operation(item).await);
        }
        outputs
    }
}

/// Returns `true` if `err` is transient and worth retrying.
///
/// Retriable: 429, 5xx, connection failures and timeouts. Everything else
/// (4xx, malformed bodies) would fail the same way again.
pub(crate) fn is_retriable(err: &DiscoveryError) -> bool {
    match err {
        DiscoveryError::RateLimited { .. } => true,
        DiscoveryError::HttpStatus { status, .. } => *status >= 500,
        DiscoveryError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        DiscoveryError::Deserialize { .. }
        | DiscoveryError::MalformedResponse { .. }
        | DiscoveryError::InvalidCoordinate(_) => false,
    }
}

const MAX_DELAY_MS: u64 = 30_000;

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 %
/// jitter, capped at 30 s. A 429 waits at least its `Retry-After`; when that
/// exceeds the cap the error is returned instead. Non-retriable errors return
/// immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, DiscoveryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DiscoveryError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let Some(delay_ms) = retry_delay_ms(&err, attempt, backoff_base_ms) else {
                    tracing::warn!(
                        error = %err,
                        "provider asked for a longer pause than the retry cap, giving up"
                    );
                    return Err(err);
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Delay before retry `attempt`, or `None` when a 429's `Retry-After` is
/// longer than [`MAX_DELAY_MS`].
fn retry_delay_ms(err: &DiscoveryError, attempt: u32, backoff_base_ms: u64) -> Option<u64> {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    match err {
        DiscoveryError::RateLimited {
            retry_after_secs, ..
        } => {
            let floor = retry_after_secs.saturating_mul(1000);
            (floor <= MAX_DELAY_MS).then(|| jittered.max(floor))
        }
        _ => Some(jittered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn server_error() -> DiscoveryError {
        DiscoveryError::HttpStatus {
            status: 503,
            url: "https://search.example/search".to_owned(),
        }
    }

    #[tokio::test]
    async fn queue_preserves_order() {
        let queue = RateLimitedQueue::new(Duration::ZERO);
        let out = queue.run(["a", "b", "c"], |s| async move { s.to_uppercase() }).await;
        assert_eq!(out, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn queue_waits_between_items_but_not_before_first() {
        let queue = RateLimitedQueue::new(Duration::from_millis(30));
        let start = Instant::now();
        let stamps = queue
            .run(0..3, |_| async move { start.elapsed() })
            .await;
        assert!(stamps[0] < Duration::from_millis(30), "first item delayed: {stamps:?}");
        assert!(stamps[1] >= Duration::from_millis(30), "{stamps:?}");
        assert!(stamps[2] >= Duration::from_millis(60), "{stamps:?}");
    }

    #[tokio::test]
    async fn queue_never_overlaps_items() {
        let in_flight = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));
        let queue = RateLimitedQueue::new(Duration::from_millis(1));
        queue
            .run(0..5, |_| {
                let in_flight = Arc::clone(&in_flight);
                let max_seen = Arc::clone(&max_seen);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .await;
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_queue_returns_immediately() {
        let queue = RateLimitedQueue::new(Duration::from_secs(5));
        let start = Instant::now();
        let out: Vec<u8> = queue.run(Vec::<u8>::new(), |x| async move { x }).await;
        assert!(out.is_empty());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn retry_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, DiscoveryError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, DiscoveryError>(DiscoveryError::RateLimited {
                    url: "https://search.example".to_owned(),
                    retry_after_secs: 0,
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(DiscoveryError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn retry_does_not_repeat_client_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, DiscoveryError>(DiscoveryError::HttpStatus {
                    status: 404,
                    url: "https://search.example".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(DiscoveryError::HttpStatus { status: 404, .. })));
    }

    fn rate_limited(retry_after_secs: u64) -> DiscoveryError {
        DiscoveryError::RateLimited {
            url: "https://search.example".to_owned(),
            retry_after_secs,
        }
    }

    #[test]
    fn rate_limited_delay_honours_retry_after() {
        for attempt in 1..=3 {
            let delay = retry_delay_ms(&rate_limited(2), attempt, 100).unwrap();
            assert!(delay >= 2_000, "attempt {attempt}: {delay} ms");
        }
    }

    #[test]
    fn backoff_wins_when_longer_than_retry_after() {
        let delay = retry_delay_ms(&rate_limited(1), 4, 1_000).unwrap();
        // 8 s backoff with at most 25 % jitter below.
        assert!(delay >= 6_000, "{delay} ms");
    }

    #[test]
    fn retry_after_beyond_cap_is_not_retried() {
        assert!(retry_delay_ms(&rate_limited(60), 1, 100).is_none());
    }

    #[test]
    fn server_error_delay_ignores_retry_after_floor() {
        let delay = retry_delay_ms(&server_error(), 1, 100).unwrap();
        assert!((75..=125).contains(&delay), "{delay} ms");
    }

    #[tokio::test]
    async fn long_retry_after_returns_without_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let start = Instant::now();
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, DiscoveryError>(rate_limited(120))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(DiscoveryError::RateLimited { .. })));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn malformed_response_is_not_retriable() {
        assert!(!is_retriable(&DiscoveryError::MalformedResponse {
            provider: "text-search",
            reason: "not an array".to_owned(),
        }));
        assert!(is_retriable(&server_error()));
    }
}
