//! Image lookups: Getty Images photo search and imgflip meme templates.
//!
//! Both sites render their galleries with client-side script, so the
//! adapters ride the same headless-browser machinery as the football
//! pipeline and share its session pool. One semaphore bounds every browser
//! the process spawns.

pub mod getty;
pub mod imgflip;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::football::{BrowserManager, FootballConfig, FootballError, ScrapeSession};

/// Which site a lookup runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Getty Images photo search, newest first.
    Getty,
    /// imgflip meme template search.
    Meme,
}

/// A resolved lookup: the query and the image it landed on.
#[derive(Clone, Debug, Serialize)]
pub struct ImageResult {
    /// The search query as received.
    pub query: String,
    /// Direct URL of the selected image.
    pub image_url: String,
}

/// Image lookup failures.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Browser or navigation failure in the scraping layer.
    #[error(transparent)]
    Scrape(#[from] FootballError),

    /// The search page rendered but held no usable image.
    #[error("No image found for query: {query}")]
    NoResults {
        /// The query that came up empty.
        query: String,
    },
}

/// Runs image lookups on the shared browser pool.
pub struct ImageService {
    config: FootballConfig,
    browser: Arc<BrowserManager>,
}

impl ImageService {
    /// Create the service on an existing browser pool.
    #[must_use]
    pub fn new(config: FootballConfig, browser: Arc<BrowserManager>) -> Self {
        Self { config, browser }
    }

    /// Find the freshest Getty Images photo for a query.
    ///
    /// # Errors
    /// [`ImageError::NoResults`] when the gallery holds no image, or any
    /// scraping-layer failure.
    pub async fn getty(&self, query: &str) -> Result<ImageResult, ImageError> {
        self.run(ImageSource::Getty, query).await
    }

    /// Find the best-matching imgflip meme template for a query.
    ///
    /// # Errors
    /// [`ImageError::NoResults`] when the search lists no template, or any
    /// scraping-layer failure.
    pub async fn meme(&self, query: &str) -> Result<ImageResult, ImageError> {
        self.run(ImageSource::Meme, query).await
    }

    async fn run(&self, source: ImageSource, query: &str) -> Result<ImageResult, ImageError> {
        let session = self.browser.acquire().await?;
        run_scoped(&session, &self.config, source, query).await
    }
}

/// Drive a lookup inside the request deadline and release the session
/// exactly once, whatever happens.
pub(crate) async fn run_scoped(
    session: &dyn ScrapeSession,
    config: &FootballConfig,
    source: ImageSource,
    query: &str,
) -> Result<ImageResult, ImageError> {
    let outcome = tokio::time::timeout(
        config.request_deadline,
        scrape(session, config, source, query),
    )
    .await;
    session.release().await;

    match outcome {
        Ok(result) => result,
        Err(_) => Err(FootballError::DeadlineExceeded.into()),
    }
}

async fn scrape(
    session: &dyn ScrapeSession,
    config: &FootballConfig,
    source: ImageSource,
    query: &str,
) -> Result<ImageResult, ImageError> {
    match source {
        ImageSource::Getty => getty::scrape(session, config, query).await,
        ImageSource::Meme => imgflip::scrape(session, config, query).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::football::session::fake::{FakePage, FakeSession};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn test_config() -> FootballConfig {
        let mut config = FootballConfig::default();
        config.retry_backoff = Duration::from_millis(1);
        config
    }

    #[tokio::test]
    async fn test_run_scoped_releases_once_on_success() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.source =
            r#"<img class="mt-img" src="//i.imgflip.com/1bij.jpg">"#.to_string();
        session.insert_page(imgflip::search_url("surprised pikachu"), page);

        let result = run_scoped(&session, &test_config(), ImageSource::Meme, "surprised pikachu")
            .await
            .unwrap();
        assert_eq!(result.image_url, "https://i.imgflip.com/1bij.jpg");
        assert_eq!(session.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_scoped_releases_once_when_nothing_matches() {
        let session = FakeSession::new();

        let result = run_scoped(&session, &test_config(), ImageSource::Getty, "nobody").await;
        assert!(matches!(result, Err(ImageError::NoResults { .. })));
        assert_eq!(session.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_scoped_releases_once_on_navigation_failure() {
        let session = FakeSession::new();
        session.fail_navigations.store(2, Ordering::SeqCst);

        let result = run_scoped(&session, &test_config(), ImageSource::Getty, "haaland").await;
        assert!(matches!(
            result,
            Err(ImageError::Scrape(FootballError::Navigation { .. }))
        ));
        assert_eq!(session.releases.load(Ordering::SeqCst), 1);
    }
}
