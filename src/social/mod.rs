//! Social content adapters: Reddit, Telegram and Instagram.
//!
//! Each adapter fetches recent posts for a target within a day window, scores
//! them with a log-weighted engagement formula and returns the top N. They are
//! deliberately thin: authenticate, paginate newest-first with stop-early at
//! the cutoff, score, sort, truncate.

pub mod engagement;
pub mod error;
pub mod instagram;
pub mod reddit;
pub mod telegram;

pub use error::SocialError;
pub use instagram::InstagramAdapter;
pub use reddit::RedditAdapter;
pub use telegram::TelegramAdapter;

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Widest day window a request may ask for; anything beyond it is clamped.
const MAX_WINDOW_DAYS: f64 = 3650.0;

/// Oldest timestamp still inside a `days`-long window ending now.
///
/// `days` comes straight from request JSON, so it is clamped to
/// `[0, MAX_WINDOW_DAYS]` (non-finite values get the full window) before the
/// seconds conversion; an unclamped cast overflows `chrono::Duration`.
pub(crate) fn window_cutoff(days: f64) -> DateTime<Utc> {
    let days = if days.is_finite() {
        days.clamp(0.0, MAX_WINDOW_DAYS)
    } else {
        MAX_WINDOW_DAYS
    };
    Utc::now() - chrono::Duration::seconds((days * 86_400.0) as i64)
}

/// Run a vendor call with bounded retry on transient failures.
///
/// Retries up to `max_attempts` total attempts, sleeping the error's own
/// suggested delay between them. Non-retryable errors propagate immediately.
pub(crate) async fn with_retry<T, F, Fut>(
    what: &str,
    max_attempts: u32,
    mut op: F,
) -> Result<T, SocialError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SocialError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = err.retry_delay().unwrap_or(2);
                tracing::warn!("{what} failed (attempt {attempt}/{max_attempts}), retrying in {delay}s: {err}");
                tokio::time::sleep(Duration::from_secs(delay)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Map a vendor response status to our error taxonomy, passing successes
/// through untouched.
pub(crate) async fn expect_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, SocialError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        return Err(SocialError::RateLimited(retry_after));
    }

    let body: String = response.text().await.unwrap_or_default().chars().take(300).collect();
    Err(SocialError::Vendor {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_window_cutoff_clamps_huge_days() {
        let cutoff = window_cutoff(1e300);
        let floor = Utc::now() - chrono::Duration::days(MAX_WINDOW_DAYS as i64 + 1);
        assert!(cutoff > floor);
        assert!(cutoff < Utc::now());
    }

    #[test]
    fn test_window_cutoff_rejects_nonsense_values() {
        assert!(window_cutoff(f64::NAN) < Utc::now());
        assert!(window_cutoff(f64::INFINITY) < Utc::now());
        // A negative window collapses to "now", never the future.
        assert!(window_cutoff(-5.0) <= Utc::now());
    }

    #[test]
    fn test_window_cutoff_ordinary_window() {
        let cutoff = window_cutoff(3.0);
        let expected = Utc::now() - chrono::Duration::days(3);
        let drift = (cutoff - expected).num_seconds().abs();
        assert!(drift <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_recovers_from_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, SocialError> = with_retry("test call", 3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(SocialError::Vendor {
                        status: 503,
                        body: "unavailable".to_string(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_fails_fast_on_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), SocialError> = with_retry("test call", 3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(SocialError::Auth("bad session".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(SocialError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), SocialError> = with_retry("test call", 2, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(SocialError::Vendor {
                    status: 502,
                    body: "bad gateway".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(SocialError::Vendor { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
