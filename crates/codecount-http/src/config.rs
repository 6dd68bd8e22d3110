//! Source endpoint configuration.

use std::time::Duration;

/// Default base URL of the fast (languages) source.
pub const DEFAULT_LANGUAGES_API: &str = "https://api.github.com";

/// Default base URL of the precise (LOC) source.
pub const DEFAULT_LOC_API: &str = "https://api.codetabs.com";

/// Endpoints and transport options for [`HttpStatsSource`](crate::HttpStatsSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Base URL of the languages API
    pub languages_api: String,
    /// Base URL of the LOC API
    pub loc_api: String,
    /// Token for the languages API (optional for public repositories)
    pub github_token: Option<String>,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Transport timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            languages_api: std::env::var("CODECOUNT_GITHUB_API")
                .unwrap_or_else(|_| DEFAULT_LANGUAGES_API.to_string()),
            loc_api: std::env::var("CODECOUNT_LOC_API")
                .unwrap_or_else(|_| DEFAULT_LOC_API.to_string()),
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            user_agent: default_user_agent(),
            timeout: std::env::var("CODECOUNT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }
}

impl SourceConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for explicit endpoints, ignoring the environment
    pub fn new(languages_api: &str, loc_api: &str) -> Self {
        SourceConfig {
            languages_api: languages_api.to_string(),
            loc_api: loc_api.to_string(),
            github_token: None,
            user_agent: default_user_agent(),
            timeout: None,
        }
    }

    pub fn with_languages_api(mut self, url: &str) -> Self {
        self.languages_api = url.to_string();
        self
    }

    pub fn with_loc_api(mut self, url: &str) -> Self {
        self.loc_api = url.to_string();
        self
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.github_token = Some(token.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn default_user_agent() -> String {
    format!("codecount/{}", env!("CARGO_PKG_VERSION"))
}
