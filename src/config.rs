//! Process configuration, loaded once at startup.
//!
//! Credentials come from the environment in named groups. A missing group is
//! not a startup failure: only the endpoints that need it report it, with the
//! exact variable names that are absent.

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use crate::football::FootballConfig;
use crate::social::instagram::InstagramCredentials;
use crate::social::reddit::RedditCredentials;

/// Default port the server binds when `CONTENTWORK_PORT` is unset.
pub const DEFAULT_PORT: u16 = 8000;

const DEFAULT_REDDIT_USER_AGENT: &str = "contentwork/0.1 by api";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variables are absent.
    #[error("Missing env: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// A credential group that is either fully configured or knows which
/// variables are missing. Resolved once at startup so request handlers never
/// consult the process environment.
#[derive(Clone, Debug)]
pub enum CredentialGroup<T> {
    /// All variables of the group were present.
    Ready(T),
    /// Names of the variables that were absent.
    Missing(Vec<String>),
}

impl<T> CredentialGroup<T> {
    /// Borrow the credentials, or fail naming every absent variable.
    ///
    /// # Errors
    /// [`ConfigError::MissingEnv`] listing the missing variable names.
    pub fn get(&self) -> Result<&T, ConfigError> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Missing(names) => Err(ConfigError::MissingEnv(names.clone())),
        }
    }
}

/// Telegram API credentials. The adapter reads public previews and does not
/// send these anywhere, but endpoints still require them to be configured,
/// matching how the service has always behaved.
#[derive(Clone, Debug)]
pub struct TelegramCredentials {
    /// Application id from my.telegram.org.
    pub api_id: String,
    /// Application hash from my.telegram.org.
    pub api_hash: String,
}

/// Full process configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Port the HTTP server binds.
    pub port: u16,
    /// User agents rotated across outbound HTTP clients.
    pub user_agents: Vec<String>,
    /// Reddit script-app credentials.
    pub reddit: CredentialGroup<RedditCredentials>,
    /// Telegram API credentials.
    pub telegram: CredentialGroup<TelegramCredentials>,
    /// Instagram session credentials.
    pub instagram: CredentialGroup<InstagramCredentials>,
    /// Gemini API key.
    pub llm: CredentialGroup<String>,
    /// Football pipeline tuning.
    pub football: FootballConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when a set variable holds an unusable value.
    /// Absent credential groups are recorded, not fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(env_opt("CONTENTWORK_PORT"))?;

        let reddit = load_reddit();
        let telegram = load_telegram();
        let instagram = match env_opt("INSTAGRAM_SESSIONID") {
            Some(sessionid) => CredentialGroup::Ready(InstagramCredentials { sessionid }),
            None => CredentialGroup::Missing(vec!["INSTAGRAM_SESSIONID".to_string()]),
        };
        let llm = match env_opt("GOOGLE_API_KEY") {
            Some(key) => CredentialGroup::Ready(key),
            None => CredentialGroup::Missing(vec!["GOOGLE_API_KEY".to_string()]),
        };

        Ok(Self {
            port,
            user_agents: default_user_agents(),
            reddit,
            telegram,
            instagram,
            llm,
            football: football_from_env()?,
        })
    }

    /// Get a random user agent from the rotation list.
    #[must_use]
    pub fn random_user_agent(&self) -> String {
        if self.user_agents.is_empty() {
            return default_user_agents()[0].clone();
        }
        let mut rng = rand::thread_rng();
        let idx = rng.gen_range(0..self.user_agents.len());
        self.user_agents[idx].clone()
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_port(raw: Option<String>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name: "CONTENTWORK_PORT",
            reason: format!("not a port number: {value}"),
        }),
    }
}

fn load_reddit() -> CredentialGroup<RedditCredentials> {
    let required = [
        "REDDIT_CLIENT_ID",
        "REDDIT_CLIENT_SECRET",
        "REDDIT_USERNAME",
        "REDDIT_PASSWORD",
    ];
    let values: Vec<Option<String>> = required.iter().map(|name| env_opt(name)).collect();
    let missing: Vec<String> = required
        .iter()
        .zip(&values)
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return CredentialGroup::Missing(missing);
    }

    let mut values = values.into_iter().flatten();
    CredentialGroup::Ready(RedditCredentials {
        client_id: values.next().unwrap_or_default(),
        client_secret: values.next().unwrap_or_default(),
        username: values.next().unwrap_or_default(),
        password: values.next().unwrap_or_default(),
        user_agent: env_opt("REDDIT_USER_AGENT")
            .unwrap_or_else(|| DEFAULT_REDDIT_USER_AGENT.to_string()),
    })
}

fn load_telegram() -> CredentialGroup<TelegramCredentials> {
    match (env_opt("TELEGRAM_API_ID"), env_opt("TELEGRAM_API_HASH")) {
        (Some(api_id), Some(api_hash)) => {
            CredentialGroup::Ready(TelegramCredentials { api_id, api_hash })
        }
        (api_id, api_hash) => {
            let mut missing = Vec::new();
            if api_id.is_none() {
                missing.push("TELEGRAM_API_ID".to_string());
            }
            if api_hash.is_none() {
                missing.push("TELEGRAM_API_HASH".to_string());
            }
            CredentialGroup::Missing(missing)
        }
    }
}

fn football_from_env() -> Result<FootballConfig, ConfigError> {
    let mut config = FootballConfig::default();
    if let Some(base_url) = env_opt("FOOTBALL_BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(secs) = env_opt("FOOTBALL_NAV_TIMEOUT_SECS") {
        config.navigation_timeout = Duration::from_secs(parse_u64("FOOTBALL_NAV_TIMEOUT_SECS", &secs)?);
    }
    if let Some(secs) = env_opt("FOOTBALL_DEADLINE_SECS") {
        config.request_deadline = Duration::from_secs(parse_u64("FOOTBALL_DEADLINE_SECS", &secs)?);
    }
    if let Some(sessions) = env_opt("FOOTBALL_MAX_SESSIONS") {
        config.max_sessions = parse_usize("FOOTBALL_MAX_SESSIONS", &sessions)?;
    }
    if let Some(path) = env_opt("CHROME_EXECUTABLE") {
        config.chrome_executable = Some(PathBuf::from(path));
    }
    Ok(config)
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("not a number: {value}"),
    })
}

// Parsed natively so out-of-range values fail instead of truncating on
// 32-bit targets.
fn parse_usize(name: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("not a count: {value}"),
    })
}

/// Default user agents for rotation.
fn default_user_agents() -> Vec<String> {
    vec![
        // Chrome on Windows
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        // Chrome on macOS
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        // Firefox on Windows
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
        // Firefox on Linux
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
        // Safari on macOS
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15".to_string(),
        // Chrome on Linux
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_group_ready() {
        let group = CredentialGroup::Ready("key".to_string());
        assert_eq!(group.get().unwrap(), "key");
    }

    #[test]
    fn test_credential_group_missing_names_all_variables() {
        let group: CredentialGroup<String> = CredentialGroup::Missing(vec![
            "TELEGRAM_API_ID".to_string(),
            "TELEGRAM_API_HASH".to_string(),
        ]);
        let err = group.get().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing env: TELEGRAM_API_ID, TELEGRAM_API_HASH"
        );
    }

    #[test]
    fn test_parse_usize_rejects_out_of_range() {
        assert_eq!(parse_usize("FOOTBALL_MAX_SESSIONS", "4").unwrap(), 4);
        assert!(matches!(
            parse_usize("FOOTBALL_MAX_SESSIONS", "99999999999999999999999"),
            Err(ConfigError::Invalid {
                name: "FOOTBALL_MAX_SESSIONS",
                ..
            })
        ));
        assert!(parse_usize("FOOTBALL_MAX_SESSIONS", "-1").is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(None).unwrap(), DEFAULT_PORT);
        assert_eq!(parse_port(Some("9090".to_string())).unwrap(), 9090);
        assert!(matches!(
            parse_port(Some("not-a-port".to_string())),
            Err(ConfigError::Invalid { name: "CONTENTWORK_PORT", .. })
        ));
    }
}
