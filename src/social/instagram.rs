//! Instagram adapter: engagement-ranked profile media via the web API.
//!
//! Authenticates with a pre-captured `sessionid` cookie, never interactively.
//! Resolves the target profile to a numeric user id, then pages the user feed
//! newest-first with stop-early at the day-window cutoff. Save counts are not
//! exposed by this surface and score zero.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::social::engagement::InstagramWeights;
use crate::social::error::SocialError;
use crate::social::{expect_success, window_cutoff, with_retry};

const PROFILE_INFO_URL: &str = "https://www.instagram.com/api/v1/users/web_profile_info/";
const FEED_BASE: &str = "https://i.instagram.com/api/v1/feed/user";
/// App id the instagram.com web client identifies itself with; requests
/// without it get an HTML login wall instead of JSON.
const IG_APP_ID: &str = "936619743392459";
const PAGE_SIZE: u32 = 33;
const MAX_PAGES: u32 = 25;
const MAX_ATTEMPTS: u32 = 3;
/// Numeric media_type for video posts in the vendor schema.
const MEDIA_TYPE_VIDEO: u8 = 2;

/// Session credentials for the web API.
#[derive(Clone, Debug)]
pub struct InstagramCredentials {
    /// `sessionid` cookie value captured from an authenticated browser.
    pub sessionid: String,
}

/// One media item with its engagement score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstagramPost {
    /// Numeric media id.
    pub pk: String,
    /// Short code used in post URLs.
    pub code: String,
    /// Publication time.
    pub taken_at: DateTime<Utc>,
    /// Like count.
    pub likes: u64,
    /// Comment count.
    pub comments: u64,
    /// View count, zero for images.
    pub views: u64,
    /// Save count; this API surface does not expose it.
    pub saves: u64,
    /// Whether the item is a video.
    pub is_video: bool,
    /// Log-weighted engagement score.
    pub engagement: f64,
}

/// Response body for a ranked profile listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstagramFeed {
    /// The profile that was queried.
    pub target: String,
    /// Top posts, engagement-descending.
    pub top: Vec<InstagramPost>,
    /// Total posts found inside the day window.
    pub count: usize,
}

#[derive(Deserialize)]
struct ProfileInfoResponse {
    data: ProfileData,
}

#[derive(Deserialize)]
struct ProfileData {
    user: Option<ProfileUser>,
}

#[derive(Deserialize)]
struct ProfileUser {
    id: String,
}

#[derive(Deserialize)]
struct FeedResponse {
    #[serde(default)]
    items: Vec<FeedItem>,
    #[serde(default)]
    more_available: bool,
    next_max_id: Option<String>,
}

#[derive(Deserialize)]
struct FeedItem {
    #[serde(default)]
    pk: serde_json::Value,
    #[serde(default)]
    code: String,
    #[serde(default)]
    taken_at: i64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    comment_count: u64,
    #[serde(default)]
    media_type: u8,
    #[serde(default)]
    play_count: Option<u64>,
    #[serde(default)]
    view_count: Option<u64>,
}

/// Engagement-ranked Instagram listings via the session-cookie web API.
pub struct InstagramAdapter {
    client: reqwest::Client,
    credentials: InstagramCredentials,
    weights: InstagramWeights,
}

impl InstagramAdapter {
    /// Create an adapter around a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, credentials: InstagramCredentials) -> Self {
        Self {
            client,
            credentials,
            weights: InstagramWeights::default(),
        }
    }

    /// Top posts of a profile within the last `days`, engagement-ranked.
    ///
    /// # Errors
    /// [`SocialError::NotFound`] for unknown profiles, [`SocialError::Auth`]
    /// when the session cookie is rejected, vendor/rate-limit errors
    /// otherwise.
    pub async fn top_posts(
        &self,
        target: &str,
        days: f64,
        top: usize,
        exclude_videos: bool,
    ) -> Result<InstagramFeed, SocialError> {
        let target = target.trim_start_matches('@');
        let user_id = with_retry("instagram profile lookup", MAX_ATTEMPTS, || {
            self.lookup_user_id(target)
        })
        .await?;
        let cutoff = window_cutoff(days);

        let mut posts = self.collect_window(&user_id, cutoff).await?;
        tracing::info!("collected {} posts from @{target}", posts.len());

        if exclude_videos {
            posts.retain(|p| !p.is_video);
        }

        posts.sort_by(|a, b| {
            b.engagement
                .partial_cmp(&a.engagement)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let count = posts.len();
        posts.truncate(top);

        Ok(InstagramFeed {
            target: target.to_string(),
            top: posts,
            count,
        })
    }

    /// Resolve a username to the numeric user id.
    async fn lookup_user_id(&self, target: &str) -> Result<String, SocialError> {
        let response = self
            .authed(self.client.get(PROFILE_INFO_URL))
            .query(&[("username", target)])
            .send()
            .await?;

        if response.status().as_u16() == 401 || response.status().as_u16() == 403 {
            return Err(SocialError::Auth(
                "sessionid rejected, capture a fresh cookie".to_string(),
            ));
        }
        if response.status().as_u16() == 404 {
            return Err(SocialError::NotFound(format!("profile {target}")));
        }

        let profile: ProfileInfoResponse = expect_success(response).await?.json().await?;
        profile
            .data
            .user
            .map(|u| u.id)
            .ok_or_else(|| SocialError::NotFound(format!("profile {target}")))
    }

    /// Page the user feed until the cutoff or the feed ends.
    async fn collect_window(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<InstagramPost>, SocialError> {
        let url = format!("{FEED_BASE}/{user_id}/");
        let mut collected = Vec::new();
        let mut max_id: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let feed = with_retry("instagram feed page", MAX_ATTEMPTS, || {
                self.fetch_page(&url, max_id.as_deref())
            })
            .await?;

            if feed.items.is_empty() {
                break;
            }

            let mut stop_early = false;
            for item in feed.items {
                let Some(taken_at) = Utc.timestamp_opt(item.taken_at, 0).single() else {
                    continue;
                };
                if taken_at < cutoff {
                    // Feed is newest-first, everything after this is older.
                    stop_early = true;
                    break;
                }
                collected.push(self.score_item(item, taken_at));
            }

            if stop_early || !feed.more_available {
                break;
            }
            max_id = feed.next_max_id;
            if max_id.is_none() {
                break;
            }
        }

        Ok(collected)
    }

    async fn fetch_page(
        &self,
        url: &str,
        max_id: Option<&str>,
    ) -> Result<FeedResponse, SocialError> {
        let mut request = self
            .authed(self.client.get(url))
            .query(&[("count", PAGE_SIZE.to_string())]);
        if let Some(max_id) = max_id {
            request = request.query(&[("max_id", max_id)]);
        }

        let response = expect_success(request.send().await?).await?;
        Ok(response.json().await?)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-ig-app-id", IG_APP_ID)
            .header(
                reqwest::header::COOKIE,
                format!("sessionid={}", self.credentials.sessionid),
            )
    }

    fn score_item(&self, item: FeedItem, taken_at: DateTime<Utc>) -> InstagramPost {
        let views = item.play_count.or(item.view_count).unwrap_or(0);
        let saves = 0;
        let engagement =
            self.weights
                .engagement(item.like_count, item.comment_count, views, saves);
        InstagramPost {
            // pk arrives as either a number or a string depending on the
            // endpoint revision.
            pk: match item.pk {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            },
            code: item.code,
            taken_at,
            likes: item.like_count,
            comments: item.comment_count,
            views,
            saves,
            is_video: item.media_type == MEDIA_TYPE_VIDEO,
            engagement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> InstagramAdapter {
        InstagramAdapter::new(
            reqwest::Client::new(),
            InstagramCredentials {
                sessionid: "abc".to_string(),
            },
        )
    }

    fn item(likes: u64, comments: u64, media_type: u8, plays: Option<u64>) -> FeedItem {
        FeedItem {
            pk: serde_json::Value::from(31415926535u64),
            code: "Cxyz".to_string(),
            taken_at: 1_700_000_000,
            like_count: likes,
            comment_count: comments,
            media_type,
            play_count: plays,
            view_count: None,
        }
    }

    #[test]
    fn test_score_item_flags_videos_and_reads_views() {
        let adapter = adapter();
        let now = Utc::now();

        let video = adapter.score_item(item(100, 10, MEDIA_TYPE_VIDEO, Some(5000)), now);
        assert!(video.is_video);
        assert_eq!(video.views, 5000);
        assert_eq!(video.pk, "31415926535");

        let image = adapter.score_item(item(100, 10, 1, None), now);
        assert!(!image.is_video);
        assert_eq!(image.views, 0);
        assert!(video.engagement > image.engagement);
    }

    #[test]
    fn test_feed_parses_vendor_shape() {
        let json = r#"{
            "items": [
                {"pk": 123, "code": "Cab", "taken_at": 1700000000,
                 "like_count": 10, "comment_count": 2, "media_type": 1},
                {"pk": "456", "code": "Ccd", "taken_at": 1700000100,
                 "like_count": 50, "comment_count": 7, "media_type": 2,
                 "play_count": 900}
            ],
            "more_available": true,
            "next_max_id": "456_789"
        }"#;
        let feed: FeedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(feed.items.len(), 2);
        assert!(feed.more_available);
        assert_eq!(feed.next_max_id.as_deref(), Some("456_789"));
        assert_eq!(feed.items[1].play_count, Some(900));
    }

    #[test]
    fn test_profile_response_without_user_is_not_found() {
        let json = r#"{"data": {"user": null}}"#;
        let profile: ProfileInfoResponse = serde_json::from_str(json).unwrap();
        assert!(profile.data.user.is_none());
    }
}
