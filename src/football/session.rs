//! Browser session capability and lifecycle management.
//!
//! The resolver and extractor only see the narrow [`ScrapeSession`] trait
//! (navigate, query, release), so they can run against a fake DOM in tests
//! without a real browser.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::football::browser::BrowserSession;
use crate::football::config::FootballConfig;
use crate::football::error::FootballError;

/// Text and link target of one matched DOM element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomNode {
    /// Rendered text of the element, whitespace as the browser reports it.
    pub text: String,
    /// `href` attribute when the element (or its anchor) carries one.
    pub href: Option<String>,
}

/// One lifecycle-bounded browser automation instance.
///
/// Guarantees: created at request start, never shared across requests,
/// and [`release`](ScrapeSession::release) is idempotent and infallible so
/// callers can invoke it on every exit path.
#[async_trait]
pub trait ScrapeSession: Send + Sync {
    /// Load a URL, failing with [`FootballError::Navigation`] on timeout or
    /// unreachable host.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), FootballError>;

    /// URL of the currently loaded page, after any client-side redirects.
    async fn current_url(&self) -> Result<String, FootballError>;

    /// Text of the first element matching `selector`, `None` when absent.
    async fn query_text(&self, selector: &str) -> Result<Option<String>, FootballError>;

    /// Text and href of every element matching `selector`.
    async fn query_nodes(&self, selector: &str) -> Result<Vec<DomNode>, FootballError>;

    /// Full serialized page source, used as a last-resort fallback.
    async fn page_source(&self) -> Result<String, FootballError>;

    /// Tear the session down. Idempotent; never fails.
    async fn release(&self);
}

/// Navigate with the retry-once-with-backoff policy for transient
/// navigation failures. Non-navigation errors propagate immediately.
pub async fn navigate_with_retry(
    session: &dyn ScrapeSession,
    url: &str,
    config: &FootballConfig,
) -> Result<(), FootballError> {
    match session.navigate(url, config.navigation_timeout).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_retryable() => {
            tracing::warn!("navigation to {url} failed, retrying once: {err}");
            tokio::time::sleep(config.retry_backoff).await;
            session.navigate(url, config.navigation_timeout).await
        }
        Err(err) => Err(err),
    }
}

/// Spawns one browser per request, bounded by a semaphore so concurrent
/// requests cannot exhaust the host. No browser instance is ever shared:
/// checkout is the spawn, checkin is the kill.
pub struct BrowserManager {
    config: FootballConfig,
    permits: Arc<Semaphore>,
}

impl BrowserManager {
    /// Create a manager for the given config. Cheap; no browser is spawned
    /// until [`acquire`](Self::acquire) is called.
    #[must_use]
    pub fn new(config: FootballConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_sessions.max(1)));
        Self { config, permits }
    }

    /// Wait for a free slot, then launch a fresh browser session.
    ///
    /// # Errors
    /// Returns [`FootballError::Browser`] if the browser cannot be started.
    pub async fn acquire(&self) -> Result<BrowserSession, FootballError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| FootballError::Browser(format!("session limiter closed: {e}")))?;
        BrowserSession::launch(&self.config, permit).await
    }
}
