//! Configuration for the football scraping subsystem.

use std::path::PathBuf;
use std::time::Duration;

/// Tuning knobs for the football pipeline.
#[derive(Clone, Debug)]
pub struct FootballConfig {
    /// Base URL of the football reference site.
    pub base_url: String,
    /// Per-navigation timeout.
    pub navigation_timeout: Duration,
    /// Whole-request deadline covering resolution and extraction.
    pub request_deadline: Duration,
    /// Backoff before the single navigation retry.
    pub retry_backoff: Duration,
    /// Maximum concurrent browser sessions.
    pub max_sessions: usize,
    /// Minimum similarity score a candidate must reach to be accepted.
    pub accept_threshold: f64,
    /// Minimum lead over the runner-up before a candidate is selected;
    /// anything closer is reported as ambiguous.
    pub ambiguity_margin: f64,
    /// Explicit Chrome/Chromium binary, when autodetection is not wanted.
    pub chrome_executable: Option<PathBuf>,
}

impl Default for FootballConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.fotmob.com".to_string(),
            navigation_timeout: Duration::from_secs(20),
            request_deadline: Duration::from_secs(120),
            retry_backoff: Duration::from_millis(1500),
            max_sessions: 2,
            accept_threshold: 0.6,
            ambiguity_margin: 0.1,
            chrome_executable: None,
        }
    }
}

impl FootballConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the target site.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-navigation timeout.
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the whole-request deadline.
    #[must_use]
    pub const fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    /// Set the concurrent session cap.
    #[must_use]
    pub const fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Set the acceptance threshold.
    #[must_use]
    pub const fn with_accept_threshold(mut self, threshold: f64) -> Self {
        self.accept_threshold = threshold;
        self
    }

    /// Set the ambiguity margin.
    #[must_use]
    pub const fn with_ambiguity_margin(mut self, margin: f64) -> Self {
        self.ambiguity_margin = margin;
        self
    }

    /// Set an explicit browser executable.
    #[must_use]
    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FootballConfig::default();
        assert_eq!(config.accept_threshold, 0.6);
        assert_eq!(config.ambiguity_margin, 0.1);
        assert_eq!(config.max_sessions, 2);
    }

    #[test]
    fn test_config_builder() {
        let config = FootballConfig::new()
            .with_base_url("http://localhost:9000")
            .with_max_sessions(4)
            .with_accept_threshold(0.7);

        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.max_sessions, 4);
        assert_eq!(config.accept_threshold, 0.7);
    }
}
