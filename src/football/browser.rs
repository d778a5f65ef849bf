//! Headless-browser implementation of [`ScrapeSession`] on chromiumoxide.
//!
//! One Chrome process per session. The CDP event handler runs on a tracked
//! task that is aborted on release so it cannot outlive the browser.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::{Mutex, OwnedSemaphorePermit};
use tokio::task::JoinHandle;

use crate::football::config::FootballConfig;
use crate::football::error::FootballError;
use crate::football::session::{DomNode, ScrapeSession};

/// A live Chrome process driven over CDP for exactly one request.
///
/// [`release`](ScrapeSession::release) closes the browser and aborts the
/// event handler; it is idempotent. If a session is dropped without release,
/// chromiumoxide's `Browser::drop` still kills the OS process.
pub struct BrowserSession {
    inner: Mutex<Option<LiveBrowser>>,
    _permit: OwnedSemaphorePermit,
}

struct LiveBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launch a fresh headless browser and open a blank page.
    ///
    /// # Errors
    /// Returns [`FootballError::Browser`] when Chrome cannot be started.
    pub(crate) async fn launch(
        config: &FootballConfig,
        permit: OwnedSemaphorePermit,
    ) -> Result<Self, FootballError> {
        let mut builder = BrowserConfigBuilder::default()
            .request_timeout(config.navigation_timeout)
            .window_size(1920, 1080)
            .headless_mode(HeadlessMode::default())
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-notifications")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| FootballError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut events) = Browser::launch(browser_config)
            .await
            .map_err(|e| FootballError::Browser(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser event handler error: {e:?}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(FootballError::Browser(format!(
                    "failed to open page: {e}"
                )));
            }
        };

        tracing::debug!("browser session started");

        Ok(Self {
            inner: Mutex::new(Some(LiveBrowser {
                browser,
                handler,
                page,
            })),
            _permit: permit,
        })
    }

    /// Run `f` against the live page, failing if the session was released.
    async fn with_page<T, F, Fut>(&self, f: F) -> Result<T, FootballError>
    where
        F: FnOnce(Page) -> Fut,
        Fut: Future<Output = Result<T, FootballError>>,
    {
        let guard = self.inner.lock().await;
        let live = guard
            .as_ref()
            .ok_or_else(|| FootballError::Browser("session already released".to_string()))?;
        let page = live.page.clone();
        drop(guard);
        f(page).await
    }
}

#[async_trait]
impl ScrapeSession for BrowserSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), FootballError> {
        self.with_page(|page| async move {
            let load = async {
                page.goto(url.to_string())
                    .await
                    .map_err(|e| FootballError::Navigation {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;
                page.wait_for_navigation()
                    .await
                    .map_err(|e| FootballError::Navigation {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(())
            };

            match tokio::time::timeout(timeout, load).await {
                Ok(result) => result,
                Err(_) => Err(FootballError::Navigation {
                    url: url.to_string(),
                    reason: format!("timed out after {}s", timeout.as_secs()),
                }),
            }
        })
        .await
    }

    async fn current_url(&self) -> Result<String, FootballError> {
        self.with_page(|page| async move {
            let url = page
                .url()
                .await
                .map_err(|e| FootballError::Browser(format!("failed to read url: {e}")))?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        })
        .await
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>, FootballError> {
        self.with_page(|page| async move {
            // A missing element is an expected outcome, not an error; the
            // extractor decides whether the field was essential.
            let Ok(element) = page.find_element(selector.to_string()).await else {
                return Ok(None);
            };
            let text = element.inner_text().await.ok().flatten();
            Ok(text
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()))
        })
        .await
    }

    async fn query_nodes(&self, selector: &str) -> Result<Vec<DomNode>, FootballError> {
        self.with_page(|page| async move {
            let elements = page
                .find_elements(selector.to_string())
                .await
                .unwrap_or_default();

            let mut nodes = Vec::with_capacity(elements.len());
            for element in elements {
                let text = element
                    .inner_text()
                    .await
                    .ok()
                    .flatten()
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default();
                let href = element.attribute("href").await.ok().flatten();
                if text.is_empty() && href.is_none() {
                    continue;
                }
                nodes.push(DomNode { text, href });
            }
            Ok(nodes)
        })
        .await
    }

    async fn page_source(&self) -> Result<String, FootballError> {
        self.with_page(|page| async move {
            page.content()
                .await
                .map_err(|e| FootballError::Browser(format!("failed to read page source: {e}")))
        })
        .await
    }

    async fn release(&self) {
        let live = self.inner.lock().await.take();
        if let Some(mut live) = live {
            if let Err(e) = live.browser.close().await {
                tracing::warn!("browser close failed: {e}");
            }
            if let Err(e) = live.browser.wait().await {
                tracing::warn!("browser did not exit cleanly: {e}");
            }
            live.handler.abort();
            tracing::debug!("browser session released");
        }
    }
}
