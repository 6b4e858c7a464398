//! Bounded retry with exponential back-off and jitter for lookup requests.
//!
//! Only transient failures are retried (network errors, 5xx). A `404` is an
//! answer, not a failure, and is returned immediately. List mutations never go
//! through this path.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::UnexpectedStatus { status, .. } => *status >= 500,
        ClientError::NotFound { .. }
        | ClientError::Deserialize { .. }
        | ClientError::InvalidResponse { .. }
        | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// Upper bound on a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Delay before retry number `attempt` (1-based): `base × 2^(attempt-1)`,
/// capped at [`MAX_DELAY`], then scaled by `jitter` (expected in `[0.75, 1.25]`).
fn backoff_delay(attempt: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let nominal = Duration::from_millis(backoff_base_ms.saturating_mul(1u64 << exponent));
    nominal.min(MAX_DELAY).mul_f64(jitter)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Sleeps [`backoff_delay`] with ±25 % jitter between attempts. With
/// `max_retries = 0` the operation runs exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retries += 1;

        let delay = backoff_delay(retries, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient site API error, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn unavailable() -> ClientError {
        ClientError::UnexpectedStatus {
            status: 503,
            url: "http://test/api/search/paris".to_owned(),
        }
    }

    /// Drives `retry_with_backoff` with zero back-off; `respond` maps the
    /// 1-based attempt number to that attempt's result.
    async fn run_counted(
        max_retries: u32,
        respond: impl Fn(u32) -> Result<u32, ClientError>,
    ) -> (Result<u32, ClientError>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(max_retries, 0, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            let outcome = respond(attempt);
            async move { outcome }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn classification_of_statuses() {
        assert!(is_retriable(&unavailable()));
        assert!(!is_retriable(&ClientError::UnexpectedStatus {
            status: 400,
            url: "http://test".to_owned()
        }));
        assert!(!is_retriable(&ClientError::NotFound {
            url: "http://test/api/sites/x".to_owned()
        }));
    }

    #[test]
    fn delay_doubles_and_is_capped() {
        assert_eq!(backoff_delay(1, 500, 1.0), Duration::from_millis(500));
        assert_eq!(backoff_delay(3, 500, 1.0), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(30, 500, 1.0), MAX_DELAY);
        assert_eq!(backoff_delay(1, 1_000, 0.75), Duration::from_millis(750));
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let (result, calls) = run_counted(0, |_| Err(unavailable())).await;
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(ClientError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn recovers_once_upstream_is_back() {
        let (result, calls) =
            run_counted(3, |attempt| if attempt < 3 { Err(unavailable()) } else { Ok(7) }).await;
        assert!(matches!(result, Ok(7)));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn stops_after_retry_budget() {
        let (result, calls) = run_counted(2, |_| Err(unavailable())).await;
        assert!(result.is_err());
        assert_eq!(calls, 3, "first attempt plus two retries");
    }

    #[tokio::test]
    async fn not_found_returns_immediately() {
        let (result, calls) = run_counted(3, |_| {
            Err(ClientError::NotFound {
                url: "http://test/api/search/atlantis".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ClientError::NotFound { .. })));
    }
}
