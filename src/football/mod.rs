//! Football query-resolution and scraping subsystem.
//!
//! Pipeline per request: normalize the free-text query, acquire a browser
//! session, resolve the best-matching entity on the live site, extract a
//! structured record from its page, assemble the response and optionally
//! persist a JSON snapshot. The session is released on every exit path,
//! including request-deadline cancellation.

pub mod assemble;
pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod query;
pub mod resolve;
pub mod session;
pub mod types;

pub use assemble::{FootballResponse, PersistenceStatus};
pub use config::FootballConfig;
pub use error::FootballError;
pub use query::QueryKind;
pub use session::{BrowserManager, ScrapeSession};
pub use types::{Candidate, ExtractedRecord};

use std::sync::Arc;

use crate::football::query::NormalizedQuery;
use crate::football::resolve::extract_entity_id;

/// Coordinates the football pipeline: one browser session per request,
/// bounded concurrency, deadline enforcement.
pub struct FootballService {
    config: FootballConfig,
    browser: Arc<BrowserManager>,
}

impl FootballService {
    /// Create the service. No browser is started until the first request.
    #[must_use]
    pub fn new(config: FootballConfig) -> Self {
        let browser = Arc::new(BrowserManager::new(config.clone()));
        Self::with_browser(config, browser)
    }

    /// Create the service on an existing browser pool so its session bound
    /// is shared with other scraping subsystems.
    #[must_use]
    pub fn with_browser(config: FootballConfig, browser: Arc<BrowserManager>) -> Self {
        Self { config, browser }
    }

    /// Run the full pipeline for a query.
    ///
    /// # Errors
    /// Any [`FootballError`] from normalization, resolution or extraction;
    /// persistence failures are reported in the response instead.
    pub async fn run(
        &self,
        kind: QueryKind,
        raw_query: &str,
        save_json: Option<&str>,
    ) -> Result<FootballResponse, FootballError> {
        let normalized = query::normalize(raw_query, kind)?;

        let session = self.browser.acquire().await?;
        let (candidate, record) = run_scoped(&session, &self.config, &normalized).await?;

        let mut response = assemble::assemble(raw_query, candidate, record);
        if let Some(path) = save_json {
            response.persistence = Some(assemble::persist(&response, path).await);
        }
        Ok(response)
    }
}

/// Drive the pipeline inside the request deadline and release the session
/// exactly once, whatever happens. Cancellation by the deadline drops the
/// in-flight pipeline future before the release runs.
pub(crate) async fn run_scoped(
    session: &dyn ScrapeSession,
    config: &FootballConfig,
    normalized: &NormalizedQuery,
) -> Result<(Candidate, ExtractedRecord), FootballError> {
    let outcome = tokio::time::timeout(
        config.request_deadline,
        run_pipeline(session, config, normalized),
    )
    .await;
    session.release().await;

    match outcome {
        Ok(result) => result,
        Err(_) => Err(FootballError::DeadlineExceeded),
    }
}

/// Resolve then extract within one live session.
async fn run_pipeline(
    session: &dyn ScrapeSession,
    config: &FootballConfig,
    normalized: &NormalizedQuery,
) -> Result<(Candidate, ExtractedRecord), FootballError> {
    tracing::debug!("resolving {:?} as {:?}", normalized.raw, normalized.kind);
    let mut candidate = resolve::resolve(session, normalized, config).await?;

    tracing::debug!("extracting from {}", candidate.url);
    let record = extract::extract(session, &candidate, normalized.kind, config).await?;

    if candidate.entity_id.is_none() {
        // The listing URL hid the id; by now the entity page is loaded, so
        // the live URL or the page source usually carries it.
        candidate.entity_id = extract_entity_id(&session.current_url().await?);
        if candidate.entity_id.is_none() {
            candidate.entity_id = extract_entity_id(&session.page_source().await?);
        }
    }

    Ok((candidate, record))
}
