//! Error types for the football scraping pipeline.

use thiserror::Error;

/// Errors that can occur while resolving and extracting football data.
#[derive(Debug, Error)]
pub enum FootballError {
    /// Navigation to a page timed out or the host was unreachable.
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        /// The URL that could not be loaded.
        url: String,
        /// What went wrong (timeout, unreachable host, protocol error).
        reason: String,
    },

    /// The request-level deadline elapsed before the pipeline finished.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// No candidate cleared the acceptance threshold.
    #[error("no entity matched query: {query}")]
    NoMatch {
        /// The normalized query text that produced no match.
        query: String,
    },

    /// The top two candidates scored within the ambiguity margin.
    #[error("ambiguous query, candidates: {}", candidates.join(", "))]
    Ambiguous {
        /// Display names of the competing candidates, best first.
        candidates: Vec<String>,
    },

    /// An essential field was absent after all fallback selectors.
    #[error("extraction failed, missing essential field: {field}")]
    MissingField {
        /// The field every fallback selector missed.
        field: &'static str,
    },

    /// The browser process could not be started or driven.
    #[error("browser error: {0}")]
    Browser(String),

    /// The raw query was empty or unusable after normalization.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl FootballError {
    /// Check if this error is worth one more attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_display_names_candidates() {
        let err = FootballError::Ambiguous {
            candidates: vec!["Joao Pedro".to_string(), "Joao Pedro Silva".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Joao Pedro"));
        assert!(msg.contains("Joao Pedro Silva"));
    }

    #[test]
    fn test_only_navigation_is_retryable() {
        let nav = FootballError::Navigation {
            url: "https://example.com".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(nav.is_retryable());
        assert!(!FootballError::DeadlineExceeded.is_retryable());
        assert!(!FootballError::MissingField { field: "score" }.is_retryable());
    }
}
