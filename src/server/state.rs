//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::football::{BrowserManager, FootballService};
use crate::images::ImageService;

/// Shared application state.
pub struct AppState {
    /// Process configuration, resolved once at startup.
    pub config: AppConfig,
    /// HTTP client shared by the social adapters and the LLM client.
    pub http: reqwest::Client,
    /// Football pipeline service.
    pub football: FootballService,
    /// Image lookup service, sharing the football browser pool.
    pub images: ImageService,
}

impl AppState {
    /// Create the application state.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let http = build_client(&config)?;
        let browser = Arc::new(BrowserManager::new(config.football.clone()));
        let football =
            FootballService::with_browser(config.football.clone(), Arc::clone(&browser));
        let images = ImageService::new(config.football.clone(), browser);

        Ok(Arc::new(Self {
            config,
            http,
            football,
            images,
        }))
    }
}

/// Build an HTTP client with appropriate headers and settings.
fn build_client(
    config: &AppConfig,
) -> Result<reqwest::Client, Box<dyn std::error::Error + Send + Sync>> {
    use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

    let mut headers = HeaderMap::new();

    // Rotate user agents to avoid detection
    let ua = config.random_user_agent();
    if let Ok(ua_value) = HeaderValue::from_str(&ua) {
        headers.insert(USER_AGENT, ua_value);
    }

    if let Ok(accept) = HeaderValue::from_str(
        "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
    ) {
        headers.insert(ACCEPT, accept);
    }

    if let Ok(lang) = HeaderValue::from_str("en-US,en;q=0.5") {
        headers.insert(ACCEPT_LANGUAGE, lang);
    }

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;
    Ok(client)
}
