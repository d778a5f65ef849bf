//! Gemini image-editing client.
//!
//! Stateless request/response wrapper around `generateContent`: fetch a
//! reference image, send it with the prompt, and hand back whatever the model
//! produced (edited image bytes or a text refusal/explanation).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Image-capable Gemini model used for edits.
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Errors from the Gemini call-out.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The reference image could not be fetched.
    #[error("Failed to fetch image from {url} (status {status})")]
    ImageFetch {
        /// The image URL that was requested.
        url: String,
        /// HTTP status the host returned.
        status: u16,
    },

    /// The API returned a non-success status.
    #[error("Gemini returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The model returned neither an image nor text.
    #[error("Model returned no image or text parts")]
    EmptyResponse,

    /// Inline image data could not be decoded.
    #[error("Invalid inline image data: {0}")]
    InvalidImageData(#[from] base64::DecodeError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// What the model produced.
#[derive(Clone, Debug)]
pub enum GeneratedContent {
    /// An edited image.
    Image {
        /// Decoded image bytes.
        bytes: Vec<u8>,
        /// MIME type reported by the model.
        mime: String,
    },
    /// Text only, typically an explanation of why no image was produced.
    Text(String),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart<'a> {
    Text(&'a str),
    InlineData(InlineData),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

/// Stateless Gemini client for image edits.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client with the default image model.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Fetch `image_url` and ask the model to edit it per `prompt`.
    ///
    /// # Errors
    /// [`LlmError::ImageFetch`] when the reference image is unreachable,
    /// [`LlmError::Api`] on API failures, [`LlmError::EmptyResponse`] when
    /// the model produced nothing usable.
    pub async fn edit_image(
        &self,
        prompt: &str,
        image_url: &str,
    ) -> Result<GeneratedContent, LlmError> {
        let (image_bytes, image_mime) = self.fetch_image(image_url).await?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text(prompt),
                    RequestPart::InlineData(InlineData {
                        mime_type: image_mime,
                        data: BASE64.encode(&image_bytes),
                    }),
                ],
            }],
        };

        let url = format!(
            "{API_BASE}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default().chars().take(300).collect();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        extract_content(generated)
    }

    async fn fetch_image(&self, url: &str) -> Result<(Vec<u8>, String), LlmError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::ImageFetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| "image/jpeg".to_string(), ToString::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok((bytes, mime))
    }
}

/// Pull the first usable part out of the response: an inline image wins,
/// otherwise the concatenated text parts.
fn extract_content(response: GenerateResponse) -> Result<GeneratedContent, LlmError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut texts = Vec::new();
    for part in parts {
        if let Some(inline) = part.inline_data {
            return Ok(GeneratedContent::Image {
                bytes: BASE64.decode(inline.data.as_bytes())?,
                mime: inline.mime_type,
            });
        }
        if let Some(text) = part.text {
            if !text.is_empty() {
                texts.push(text);
            }
        }
    }

    if texts.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(GeneratedContent::Text(texts.join(" ")))
}
