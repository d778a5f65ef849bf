//! Reddit adapter: OAuth2 script-app authentication and engagement-ranked
//! subreddit listings.
//!
//! Pages `/r/{sub}/new` newest-first and stops as soon as a post older than
//! the cutoff shows up, so deep history is never pulled.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::social::engagement::RedditWeights;
use crate::social::error::SocialError;
use crate::social::{expect_success, window_cutoff, with_retry};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_API_BASE: &str = "https://oauth.reddit.com";
const PAGE_LIMIT: u32 = 100;
const MAX_PAGES: u32 = 30;
const MAX_ATTEMPTS: u32 = 3;

/// Script-app credentials for the OAuth2 password grant.
#[derive(Clone, Debug)]
pub struct RedditCredentials {
    /// App client id from the Reddit app console.
    pub client_id: String,
    /// App client secret.
    pub client_secret: String,
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
    /// User agent sent on every call; Reddit throttles generic agents hard.
    pub user_agent: String,
}

/// One subreddit post with its engagement score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedditPost {
    /// Short post id.
    pub id: String,
    /// Fullname, like `t3_xxx`.
    pub name: String,
    /// Creation time.
    pub created_utc: DateTime<Utc>,
    /// Post title.
    pub title: String,
    /// Upvote score.
    pub score: i64,
    /// Comment count.
    pub num_comments: u64,
    /// Award count.
    pub total_awards_received: u64,
    /// Relative permalink.
    pub permalink: String,
    /// Author username.
    pub author: String,
    /// Log-weighted engagement score.
    pub engagement: f64,
}

/// Response body for a ranked subreddit listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedditFeed {
    /// The subreddit that was queried.
    pub subreddit: String,
    /// Top posts, engagement-descending.
    pub top: Vec<RedditPost>,
    /// Total posts found inside the day window.
    pub count: usize,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: RawPost,
}

#[derive(Deserialize)]
struct RawPost {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    total_awards_received: u64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    author: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Engagement-ranked Reddit listings via the official OAuth API.
pub struct RedditAdapter {
    client: reqwest::Client,
    credentials: RedditCredentials,
    weights: RedditWeights,
}

impl RedditAdapter {
    /// Create an adapter around a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, credentials: RedditCredentials) -> Self {
        Self {
            client,
            credentials,
            weights: RedditWeights::default(),
        }
    }

    /// Fetch an OAuth2 access token with the password grant.
    async fn fetch_token(&self) -> Result<String, SocialError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", &self.credentials.username),
                ("password", &self.credentials.password),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default().chars().take(300).collect();
            return Err(SocialError::Auth(format!(
                "token request returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Top posts of a subreddit within the last `days`, engagement-ranked.
    ///
    /// # Errors
    /// [`SocialError::Auth`] on credential problems, [`SocialError::Vendor`]
    /// or [`SocialError::RateLimited`] on API failures.
    pub async fn top_posts(
        &self,
        subreddit: &str,
        days: f64,
        top: usize,
    ) -> Result<RedditFeed, SocialError> {
        let token = with_retry("reddit token", MAX_ATTEMPTS, || self.fetch_token()).await?;
        let cutoff = window_cutoff(days);

        let mut posts = self.collect_window(subreddit, &token, cutoff).await?;
        tracing::info!("collected {} posts from r/{subreddit}", posts.len());

        posts.sort_by(|a, b| {
            b.engagement
                .partial_cmp(&a.engagement)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let count = posts.len();
        posts.truncate(top);

        Ok(RedditFeed {
            subreddit: subreddit.to_string(),
            top: posts,
            count,
        })
    }

    /// Page `/new` until the cutoff or the listing ends.
    async fn collect_window(
        &self,
        subreddit: &str,
        token: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RedditPost>, SocialError> {
        let url = format!("{OAUTH_API_BASE}/r/{subreddit}/new");
        let mut collected = Vec::new();
        let mut after: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let listing = with_retry("reddit page", MAX_ATTEMPTS, || {
                self.fetch_page(&url, token, after.as_deref())
            })
            .await?;

            if listing.data.children.is_empty() {
                break;
            }

            let mut stop_early = false;
            for child in listing.data.children {
                let Some(created) = Utc.timestamp_opt(child.data.created_utc as i64, 0).single()
                else {
                    continue;
                };
                if created < cutoff {
                    // /new is newest-first, everything after this is older.
                    stop_early = true;
                    break;
                }
                collected.push(self.score_post(child.data, created));
            }

            if stop_early {
                break;
            }
            after = listing.data.after;
            if after.is_none() {
                break;
            }
        }

        Ok(collected)
    }

    async fn fetch_page(
        &self,
        url: &str,
        token: &str,
        after: Option<&str>,
    ) -> Result<Listing, SocialError> {
        let mut request = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .query(&[("limit", PAGE_LIMIT.to_string())]);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }

        let response = expect_success(request.send().await?).await?;
        Ok(response.json().await?)
    }

    fn score_post(&self, raw: RawPost, created: DateTime<Utc>) -> RedditPost {
        let engagement = self.weights.engagement(
            raw.score,
            raw.num_comments,
            raw.total_awards_received,
        );
        RedditPost {
            id: raw.id,
            name: raw.name,
            created_utc: created,
            title: raw.title,
            score: raw.score,
            num_comments: raw.num_comments,
            total_awards_received: raw.total_awards_received,
            permalink: raw.permalink,
            author: raw.author,
            engagement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> RedditAdapter {
        RedditAdapter::new(
            reqwest::Client::new(),
            RedditCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                username: "user".to_string(),
                password: "pass".to_string(),
                user_agent: "contentwork/0.1".to_string(),
            },
        )
    }

    fn raw(score: i64, comments: u64, awards: u64) -> RawPost {
        RawPost {
            id: "abc123".to_string(),
            name: "t3_abc123".to_string(),
            created_utc: 1_700_000_000.0,
            title: "Title".to_string(),
            score,
            num_comments: comments,
            total_awards_received: awards,
            permalink: "/r/soccer/comments/abc123/title/".to_string(),
            author: "someone".to_string(),
        }
    }

    #[test]
    fn test_score_post_orders_by_engagement() {
        let adapter = adapter();
        let now = Utc::now();
        let hot = adapter.score_post(raw(5000, 800, 3), now);
        let cold = adapter.score_post(raw(12, 2, 0), now);
        assert!(hot.engagement > cold.engagement);
    }

    #[test]
    fn test_listing_parses_reddit_shape() {
        let json = r#"{
            "data": {
                "children": [
                    {"data": {"id": "x1", "name": "t3_x1", "created_utc": 1700000000.0,
                              "title": "A", "score": 10, "num_comments": 3,
                              "total_awards_received": 0,
                              "permalink": "/r/soccer/x1/", "author": "a"}}
                ],
                "after": "t3_x1"
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        assert_eq!(listing.data.children[0].data.id, "x1");
        assert_eq!(listing.data.after.as_deref(), Some("t3_x1"));
    }

    #[test]
    fn test_listing_tolerates_missing_fields() {
        let json = r#"{"data": {"children": [{"data": {"id": "x1"}}], "after": null}}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children[0].data.score, 0);
        assert!(listing.data.after.is_none());
    }
}
