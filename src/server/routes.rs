//! HTTP route handlers for the content API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::football::{FootballError, FootballResponse, QueryKind};
use crate::images::{ImageError, ImageResult};
use crate::llm::{GeminiClient, GeneratedContent, LlmError};
use crate::social::{InstagramAdapter, RedditAdapter, SocialError, TelegramAdapter};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/reddit", post(reddit_top))
        .route("/telegram", post(telegram_top))
        .route("/instagram", post(instagram_top))
        .route("/football/league", post(football_league))
        .route("/football/match", post(football_match))
        .route("/football/player", post(football_player))
        .route("/images", post(image_search))
        .route("/grabMeme", post(grab_meme))
        .route("/generateImage", post(generate_image))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "contentwork",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

const fn default_days() -> f64 {
    3.0
}

const fn default_top() -> usize {
    20
}

/// Reddit listing request.
#[derive(Debug, Deserialize)]
pub struct RedditRequest {
    /// Subreddit to query, without the `r/` prefix.
    pub subreddit: String,
    /// Day window to include.
    #[serde(default = "default_days")]
    pub days: f64,
    /// How many top posts to return.
    #[serde(default = "default_top")]
    pub top: usize,
}

async fn reddit_top(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RedditRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let credentials = state
        .config
        .reddit
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let adapter = RedditAdapter::new(state.http.clone(), credentials.clone());
    let feed = adapter
        .top_posts(&request.subreddit, request.days, request.top)
        .await
        .map_err(social_error)?;
    Ok(Json(feed))
}

/// Telegram listing request.
#[derive(Debug, Deserialize)]
pub struct TelegramRequest {
    /// Channel username or `t.me` link.
    pub channel: String,
    /// Day window to include.
    #[serde(default = "default_days")]
    pub days: f64,
    /// How many top messages to return.
    #[serde(default = "default_top")]
    pub top: usize,
}

async fn telegram_top(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TelegramRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // API credentials must be configured even though the public preview
    // transport does not send them.
    state
        .config
        .telegram
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let adapter = TelegramAdapter::new(state.http.clone());
    let feed = adapter
        .top_messages(&request.channel, request.days, request.top)
        .await
        .map_err(social_error)?;
    Ok(Json(feed))
}

/// Instagram listing request.
#[derive(Debug, Deserialize)]
pub struct InstagramRequest {
    /// Target profile username.
    pub target: String,
    /// Day window to include.
    #[serde(default = "default_days")]
    pub days: f64,
    /// How many top posts to return.
    #[serde(default = "default_top")]
    pub top: usize,
    /// Drop video posts from the ranking.
    #[serde(default)]
    pub exclude_videos: bool,
}

async fn instagram_top(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InstagramRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let credentials = state
        .config
        .instagram
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let adapter = InstagramAdapter::new(state.http.clone(), credentials.clone());
    let feed = adapter
        .top_posts(
            &request.target,
            request.days,
            request.top,
            request.exclude_videos,
        )
        .await
        .map_err(social_error)?;
    Ok(Json(feed))
}

/// Football query request, shared by all three kinds.
#[derive(Debug, Deserialize)]
pub struct FootballRequest {
    /// Free-text query, e.g. "chelsea vs benfica".
    pub query: String,
    /// Optional path for a JSON snapshot of the result.
    pub save_json: Option<String>,
}

async fn football_league(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FootballRequest>,
) -> Result<Json<FootballResponse>, (StatusCode, String)> {
    run_football(&state, QueryKind::League, request).await
}

async fn football_match(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FootballRequest>,
) -> Result<Json<FootballResponse>, (StatusCode, String)> {
    run_football(&state, QueryKind::Match, request).await
}

async fn football_player(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FootballRequest>,
) -> Result<Json<FootballResponse>, (StatusCode, String)> {
    run_football(&state, QueryKind::Player, request).await
}

async fn run_football(
    state: &AppState,
    kind: QueryKind,
    request: FootballRequest,
) -> Result<Json<FootballResponse>, (StatusCode, String)> {
    let response = state
        .football
        .run(kind, &request.query, request.save_json.as_deref())
        .await
        .map_err(football_error)?;
    Ok(Json(response))
}

/// Image lookup request, shared by the Getty and meme endpoints.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    /// Free-text search query.
    pub query: String,
}

async fn image_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageResult>, (StatusCode, String)> {
    let result = state
        .images
        .getty(&request.query)
        .await
        .map_err(image_error)?;
    Ok(Json(result))
}

async fn grab_meme(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageResult>, (StatusCode, String)> {
    let result = state
        .images
        .meme(&request.query)
        .await
        .map_err(image_error)?;
    Ok(Json(result))
}

/// Image edit request.
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    /// Edit instruction for the model.
    pub query: String,
    /// URL of the reference image.
    pub image_url: String,
}

/// Text fallback body when the model returns no image.
#[derive(Debug, Serialize)]
pub struct GeneratedTextResponse {
    /// The original edit instruction.
    pub query: String,
    /// What the model said instead of producing an image.
    pub text: String,
}

async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Response, (StatusCode, String)> {
    let api_key = state
        .config
        .llm
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let client = GeminiClient::new(state.http.clone(), api_key.clone());
    let generated = client
        .edit_image(&request.query, &request.image_url)
        .await
        .map_err(llm_error)?;

    Ok(match generated {
        GeneratedContent::Image { bytes, mime } => {
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        GeneratedContent::Text(text) => Json(GeneratedTextResponse {
            query: request.query,
            text,
        })
        .into_response(),
    })
}

/// Map a football pipeline failure to an HTTP status.
fn football_error(err: FootballError) -> (StatusCode, String) {
    let status = football_status(&err);
    (status, err.to_string())
}

fn football_status(err: &FootballError) -> StatusCode {
    match err {
        FootballError::Navigation { .. } => StatusCode::BAD_GATEWAY,
        FootballError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        FootballError::NoMatch { .. } => StatusCode::NOT_FOUND,
        FootballError::Ambiguous { .. } => StatusCode::CONFLICT,
        FootballError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        FootballError::MissingField { .. } | FootballError::Browser(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Map an image lookup failure to an HTTP status.
fn image_error(err: ImageError) -> (StatusCode, String) {
    let status = match &err {
        ImageError::NoResults { .. } => StatusCode::NOT_FOUND,
        ImageError::Scrape(inner) => football_status(inner),
    };
    (status, err.to_string())
}

/// Map a social adapter failure to an HTTP status.
fn social_error(err: SocialError) -> (StatusCode, String) {
    let status = match &err {
        SocialError::MissingCredentials(_) | SocialError::Auth(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        SocialError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        SocialError::NotFound(_) => StatusCode::NOT_FOUND,
        SocialError::Http(_)
        | SocialError::Vendor { .. }
        | SocialError::JsonParse(_)
        | SocialError::HtmlParse(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

/// Map an LLM failure to an HTTP status.
fn llm_error(err: LlmError) -> (StatusCode, String) {
    let status = match &err {
        LlmError::ImageFetch { .. } => StatusCode::BAD_REQUEST,
        LlmError::Http(_) | LlmError::Api { .. } | LlmError::JsonParse(_) => {
            StatusCode::BAD_GATEWAY
        }
        LlmError::EmptyResponse | LlmError::InvalidImageData(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}
