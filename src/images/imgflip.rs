//! imgflip meme template lookup via the public search page.

use scraper::{Html, Selector};

use crate::football::config::FootballConfig;
use crate::football::session::{ScrapeSession, navigate_with_retry};

use super::{ImageError, ImageResult};

const SEARCH_BASE: &str = "https://imgflip.com/memesearch";

/// Template thumbnail selectors, primary first.
const TEMPLATE_SELECTORS: [&str; 3] = [
    "img.mm-img",
    ".mt-box img",
    "img[src*='i.imgflip.com']",
];

/// Search page URL for a query.
pub(crate) fn search_url(query: &str) -> String {
    format!("{SEARCH_BASE}?q={}", urlencoding::encode(query))
}

/// First template thumbnail on the search page. imgflip serves
/// protocol-relative sources, normalized here to https.
pub(crate) fn pick_meme(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for selector in TEMPLATE_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        if let Some(src) = document
            .select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .next()
        {
            return Some(absolute(src));
        }
    }
    None
}

fn absolute(src: &str) -> String {
    match src.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => src.to_string(),
    }
}

/// Run the lookup inside a live session.
pub(crate) async fn scrape(
    session: &dyn ScrapeSession,
    config: &FootballConfig,
    query: &str,
) -> Result<ImageResult, ImageError> {
    navigate_with_retry(session, &search_url(query), config).await?;
    let html = session.page_source().await?;
    match pick_meme(&html) {
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

    #[test]
    fn test_pick_meme_normalizes_protocol_relative_source() {
        let html = r#"<div class="mt-box">
            <img class="mt-img" src="//i.imgflip.com/9ehk.jpg">
        </div>"#;
        assert_eq!(
            pick_meme(html).as_deref(),
            Some("https://i.imgflip.com/9ehk.jpg")
        );
    }

    #[test]
    fn test_pick_meme_takes_first_of_many() {
        let html = r#"
            <img class="mm-img" src="https://i.imgflip.com/first.jpg">
            <img class="mm-img" src="https://i.imgflip.com/second.jpg">"#;
        assert_eq!(
            pick_meme(html).as_deref(),
            Some("https://i.imgflip.com/first.jpg")
        );
    }

    #[test]
    fn test_pick_meme_empty_page_is_none() {
        assert!(pick_meme("<html><body>no templates</body></html>").is_none());
    }

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            search_url("distracted boyfriend"),
            "https://imgflip.com/memesearch?q=distracted%20boyfriend"
        );
    }

    #[tokio::test]
    async fn test_scrape_reports_empty_search_as_no_results() {
        let session = FakeSession::new();
        session.insert_page(search_url("zzzz"), FakePage::default());

        let mut config = FootballConfig::default();
        config.retry_backoff = Duration::from_millis(1);

        let result = scrape(&session, &config, "zzzz").await;
        assert!(matches!(result, Err(ImageError::NoResults { .. })));
    }
}
