//! Error types for the social adapters.

use thiserror::Error;

/// Errors that can occur while fetching social content.
#[derive(Debug, Error)]
pub enum SocialError {
    /// Required credentials are not configured.
    #[error("Missing env: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication with the vendor failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Vendor returned a non-success status.
    #[error("Vendor returned {status}: {body}")]
    Vendor {
        /// HTTP status code from the vendor.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimited(u64),

    /// The requested account or channel does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// HTML parsing error.
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),
}

impl SocialError {
    /// Check if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) => true,
            Self::Vendor { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get retry delay in seconds if applicable.
    #[must_use]
    pub const fn retry_delay(&self) -> Option<u64> {
        match self {
            Self::RateLimited(seconds) => Some(*seconds),
            Self::Http(_) => Some(2),
            Self::Vendor { status, .. } if *status >= 500 => Some(3),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_lists_names() {
        let err = SocialError::MissingCredentials(vec![
            "REDDIT_CLIENT_ID".to_string(),
            "REDDIT_CLIENT_SECRET".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing env: REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retry_classification() {
        assert!(SocialError::RateLimited(30).is_retryable());
        assert_eq!(SocialError::RateLimited(30).retry_delay(), Some(30));

        let server = SocialError::Vendor {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(server.is_retryable());
        assert_eq!(server.retry_delay(), Some(3));

        let client = SocialError::Vendor {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert!(!client.is_retryable());
        assert_eq!(client.retry_delay(), None);

        assert!(!SocialError::Auth("bad session".to_string()).is_retryable());
    }
}
