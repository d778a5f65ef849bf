//! Telegram adapter: engagement-ranked channel messages from the public
//! web preview.
//!
//! Public channels mirror their history at `t.me/s/{channel}`, which needs
//! no MTProto session. The preview exposes message text, timestamps and view
//! counts; metrics it hides (forwards, replies, reactions) score zero in the
//! engagement formula. Pages are walked backwards with `?before={id}` until
//! the day-window cutoff.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::social::engagement::TelegramWeights;
use crate::social::error::SocialError;
use crate::social::{expect_success, window_cutoff, with_retry};

const PREVIEW_BASE: &str = "https://t.me/s";
const MAX_PAGES: u32 = 20;
const MAX_ATTEMPTS: u32 = 3;

/// One channel message with its engagement score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelegramMessage {
    /// Message id within the channel.
    pub id: u64,
    /// Publication time.
    pub date: DateTime<Utc>,
    /// Message text, empty for media-only posts.
    pub text: String,
    /// View count as shown in the preview.
    pub views: u64,
    /// Log-weighted engagement score.
    pub engagement: f64,
}

/// Response body for a ranked channel listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelegramFeed {
    /// The channel that was queried.
    pub channel: String,
    /// Top messages, engagement-descending.
    pub top: Vec<TelegramMessage>,
    /// Total messages found inside the day window.
    pub count: usize,
}

struct ParsedMessage {
    id: u64,
    date: DateTime<Utc>,
    text: String,
    views: u64,
}

/// Engagement-ranked Telegram channel listings via the public preview.
pub struct TelegramAdapter {
    client: reqwest::Client,
    weights: TelegramWeights,
}

impl TelegramAdapter {
    /// Create an adapter around a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            weights: TelegramWeights::default(),
        }
    }

    /// Top messages of a channel within the last `days`, engagement-ranked.
    ///
    /// # Errors
    /// [`SocialError::NotFound`] when the channel has no public preview,
    /// [`SocialError::Vendor`] / [`SocialError::RateLimited`] on transport
    /// failures.
    pub async fn top_messages(
        &self,
        channel: &str,
        days: f64,
        top: usize,
    ) -> Result<TelegramFeed, SocialError> {
        let channel = channel
            .trim_start_matches("https://t.me/")
            .trim_start_matches('@');
        let cutoff = window_cutoff(days);

        let mut collected: Vec<ParsedMessage> = Vec::new();
        let mut before: Option<u64> = None;

        for page in 0..MAX_PAGES {
            let html = with_retry("telegram preview page", MAX_ATTEMPTS, || {
                self.fetch_page(channel, before)
            })
            .await?;
            let messages = parse_preview(&html)?;

            if messages.is_empty() {
                if page == 0 {
                    return Err(SocialError::NotFound(format!(
                        "channel {channel} has no public preview"
                    )));
                }
                break;
            }

            // The preview lists oldest-first within a page.
            let oldest_id = messages.iter().map(|m| m.id).min().unwrap_or(0);
            let oldest_date = messages.iter().map(|m| m.date).min();

            collected.extend(messages.into_iter().filter(|m| m.date >= cutoff));

            match oldest_date {
                // Oldest message on the page is still inside the window, so
                // older pages may contain more.
                Some(date) if date >= cutoff && oldest_id > 1 => before = Some(oldest_id),
                _ => break,
            }
        }

        tracing::info!("collected {} messages from t.me/{channel}", collected.len());

        let mut scored: Vec<TelegramMessage> = collected
            .into_iter()
            .map(|m| TelegramMessage {
                engagement: self.weights.engagement(m.views, 0, 0, 0),
                id: m.id,
                date: m.date,
                text: m.text,
                views: m.views,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.engagement
                .partial_cmp(&a.engagement)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let count = scored.len();
        scored.truncate(top);

        Ok(TelegramFeed {
            channel: channel.to_string(),
            top: scored,
            count,
        })
    }

    async fn fetch_page(&self, channel: &str, before: Option<u64>) -> Result<String, SocialError> {
        let mut request = self.client.get(format!("{PREVIEW_BASE}/{channel}"));
        if let Some(before) = before {
            request = request.query(&[("before", before.to_string())]);
        }
        let response = expect_success(request.send().await?).await?;
        Ok(response.text().await?)
    }
}

/// Parse every message block out of a preview page.
fn parse_preview(html: &str) -> Result<Vec<ParsedMessage>, SocialError> {
    let document = Html::parse_document(html);

    let message_selector = Selector::parse(".tgme_widget_message")
        .map_err(|e| SocialError::HtmlParse(format!("invalid selector: {e:?}")))?;
    let text_selector = Selector::parse(".tgme_widget_message_text")
        .map_err(|e| SocialError::HtmlParse(format!("invalid selector: {e:?}")))?;
    let views_selector = Selector::parse(".tgme_widget_message_views")
        .map_err(|e| SocialError::HtmlParse(format!("invalid selector: {e:?}")))?;
    let time_selector = Selector::parse("time[datetime]")
        .map_err(|e| SocialError::HtmlParse(format!("invalid selector: {e:?}")))?;

    let mut messages = Vec::new();
    for element in document.select(&message_selector) {
        // data-post holds "channel/12345".
        let Some(id) = element
            .value()
            .attr("data-post")
            .and_then(|p| p.rsplit('/').next())
            .and_then(|id| id.parse().ok())
        else {
            continue;
        };

        let Some(date) = element
            .select(&time_selector)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
        else {
            continue;
        };

        let text = element
            .select(&text_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let views = element
            .select(&views_selector)
            .next()
            .map(|e| e.text().collect::<String>())
            .and_then(|v| parse_compact_count(&v))
            .unwrap_or(0);

        messages.push(ParsedMessage {
            id,
            date,
            text,
            views,
        });
    }

    Ok(messages)
}

/// Parse a compact count like "1.2K", "3.4M" or "987".
fn parse_compact_count(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace([',', ' '], "");
    if cleaned.is_empty() {
        return None;
    }

    let (digits, multiplier) = match cleaned.chars().last() {
        Some('K' | 'k') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('M' | 'm') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    digits.parse::<f64>().ok().map(|n| (n * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_count() {
        assert_eq!(parse_compact_count("987"), Some(987));
        assert_eq!(parse_compact_count("1.2K"), Some(1200));
        assert_eq!(parse_compact_count("3.4M"), Some(3_400_000));
        assert_eq!(parse_compact_count(" 12,345 "), Some(12_345));
        assert_eq!(parse_compact_count(""), None);
        assert_eq!(parse_compact_count("n/a"), None);
    }

    #[test]
    fn test_parse_preview_extracts_messages() {
        let html = r#"
            <div class="tgme_widget_message" data-post="somechannel/101">
                <div class="tgme_widget_message_text">First goal of the night</div>
                <span class="tgme_widget_message_views">1.2K</span>
                <time datetime="2026-08-29T18:30:00+00:00">18:30</time>
            </div>
            <div class="tgme_widget_message" data-post="somechannel/102">
                <span class="tgme_widget_message_views">640</span>
                <time datetime="2026-08-29T19:00:00+00:00">19:00</time>
            </div>
        "#;
        let messages = parse_preview(html).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, 101);
        assert_eq!(messages[0].text, "First goal of the night");
        assert_eq!(messages[0].views, 1200);
        // Media-only post: no text block, still counted.
        assert_eq!(messages[1].text, "");
        assert_eq!(messages[1].views, 640);
    }

    #[test]
    fn test_parse_preview_skips_blocks_without_id_or_date() {
        let html = r#"
            <div class="tgme_widget_message">
                <time datetime="2026-08-29T18:30:00+00:00">18:30</time>
            </div>
            <div class="tgme_widget_message" data-post="somechannel/7"></div>
        "#;
        let messages = parse_preview(html).unwrap();
        assert!(messages.is_empty());
    }
}
