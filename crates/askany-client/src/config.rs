//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client starts with zero configuration
//! against a local development backend.

use std::path::PathBuf;
use std::time::Duration;

use askany_shared::constants::{
    DEFAULT_API_URL, DEFAULT_APP_URL, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STATS_INTERVAL_SECS,
};
use askany_shared::SessionSlug;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    /// Env: `ASKANY_API_URL`
    /// Default: `http://localhost:3001`
    pub api_url: String,

    /// Public URL of the web front-end, used to build share links.
    /// Env: `ASKANY_APP_URL`
    /// Default: `http://localhost:3000`
    pub app_url: String,

    /// Delay between two session polls.
    /// Env: `ASKANY_POLL_INTERVAL_MS`
    /// Default: 5 s
    pub poll_interval: Duration,

    /// Delay between two stats refreshes.
    /// Env: `ASKANY_STATS_INTERVAL_SECS`
    /// Default: 5 min
    pub stats_interval: Duration,

    /// Per-request HTTP timeout.
    /// Env: `ASKANY_REQUEST_TIMEOUT_SECS`
    /// Default: 10 s
    pub request_timeout: Duration,

    /// Directory holding `askany.db`. `None` uses the platform data dir.
    /// Env: `ASKANY_DATA_DIR`
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            stats_interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("ASKANY_API_URL") {
            match normalize_base_url(&url) {
                Some(url) => config.api_url = url,
                None => tracing::warn!(value = %url, "Invalid ASKANY_API_URL, using default"),
            }
        }

        if let Some(url) = var("ASKANY_APP_URL") {
            match normalize_base_url(&url) {
                Some(url) => config.app_url = url,
                None => tracing::warn!(value = %url, "Invalid ASKANY_APP_URL, using default"),
            }
        }

        if let Some(val) = var("ASKANY_POLL_INTERVAL_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid ASKANY_POLL_INTERVAL_MS, using default"),
            }
        }

        if let Some(val) = var("ASKANY_STATS_INTERVAL_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.stats_interval = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %val, "Invalid ASKANY_STATS_INTERVAL_SECS, using default")
                }
            }
        }

        if let Some(val) = var("ASKANY_REQUEST_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %val, "Invalid ASKANY_REQUEST_TIMEOUT_SECS, using default")
                }
            }
        }

        if let Some(dir) = var("ASKANY_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        config
    }

    /// Override the API URL, e.g. from a command-line flag.
    pub fn with_api_url(mut self, url: &str) -> Option<Self> {
        self.api_url = normalize_base_url(url)?;
        Some(self)
    }

    /// Link participants open to join a session.
    pub fn share_link(&self, slug: &SessionSlug) -> String {
        format!("{}/session/{}", self.app_url, slug)
    }
}

/// Accept only http(s) URLs and strip trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))?;
    if rest.is_empty() {
        return None;
    }
    Some(url.to_string())
}
