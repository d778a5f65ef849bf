//! Getty Images lookup: search newest-first and pick a gallery photo.

use scraper::{Html, Selector};

use crate::football::config::FootballConfig;
use crate::football::session::{ScrapeSession, navigate_with_retry};

use super::{ImageError, ImageResult};

const SEARCH_BASE: &str = "https://www.gettyimages.com/photos";

/// Gallery selectors, primary first. The test-id container tracks the
/// current markup; the src filter survives class churn.
const GALLERY_SELECTORS: [&str; 2] = [
    "div[data-testid='gallery-items-container'] img",
    "img[src*='media.gettyimages']",
];

/// Search page URL for a query, sorted newest-first.
pub(crate) fn search_url(query: &str) -> String {
    format!("{SEARCH_BASE}/{}?sortby=newest", urlencoding::encode(query))
}

/// Pick an image URL out of the rendered search page.
///
/// The first tile is frequently promotional, so the second is preferred
/// when the gallery holds more than one.
pub(crate) fn pick_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for selector in GALLERY_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        let sources: Vec<&str> = document
            .select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| src.starts_with("http"))
            .collect();
        if let Some(src) = sources.get(1).or_else(|| sources.first()) {
            return Some((*src).to_string());
        }
    }
    None
}

/// Run the lookup inside a live session.
pub(crate) async fn scrape(
    session: &dyn ScrapeSession,
    config: &FootballConfig,
    query: &str,
) -> Result<ImageResult, ImageError> {
    navigate_with_retry(session, &search_url(query), config).await?;
    let html = session.page_source().await?;
    match pick_image(&html) {
        Some(image_url) => Ok(ImageResult {
            query: query.to_string(),
            image_url,
        }),
        None => Err(ImageError::NoResults {
            query: query.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::football::session::fake::{FakePage, FakeSession};
    use std::time::Duration;

    const GALLERY_HTML: &str = r#"
        <div data-testid="gallery-items-container">
            <div data-testid="galleryMosaicAsset">
                <img src="https://media.gettyimages.com/photos/promo.jpg">
            </div>
            <div data-testid="galleryMosaicAsset">
                <img src="https://media.gettyimages.com/photos/newest.jpg">
            </div>
        </div>"#;

    #[test]
    fn test_pick_image_prefers_second_tile() {
        assert_eq!(
            pick_image(GALLERY_HTML).as_deref(),
            Some("https://media.gettyimages.com/photos/newest.jpg")
        );
    }

    #[test]
    fn test_pick_image_accepts_single_tile() {
        let html = r#"<div data-testid="gallery-items-container">
            <img src="https://media.gettyimages.com/photos/only.jpg">
        </div>"#;
        assert_eq!(
            pick_image(html).as_deref(),
            Some("https://media.gettyimages.com/photos/only.jpg")
        );
    }

    #[test]
    fn test_pick_image_ignores_non_http_sources() {
        let html = r#"<div data-testid="gallery-items-container">
            <img src="data:image/gif;base64,R0lGOD">
        </div>"#;
        assert!(pick_image(html).is_none());
    }

    #[test]
    fn test_pick_image_empty_page_is_none() {
        assert!(pick_image("<html><body></body></html>").is_none());
    }

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            search_url("erling haaland"),
            "https://www.gettyimages.com/photos/erling%20haaland?sortby=newest"
        );
    }

    #[tokio::test]
    async fn test_scrape_returns_query_and_url() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.source = GALLERY_HTML.to_string();
        session.insert_page(search_url("erling haaland"), page);

        let mut config = FootballConfig::default();
        config.retry_backoff = Duration::from_millis(1);

        let result = scrape(&session, &config, "erling haaland").await.unwrap();
        assert_eq!(result.query, "erling haaland");
        assert_eq!(
            result.image_url,
            "https://media.gettyimages.com/photos/newest.jpg"
        );
    }
}
