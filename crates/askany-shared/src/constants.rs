use crate::types::SessionSlug;

/// Application name
pub const APP_NAME: &str = "AskAny";

/// Display name used when a question has no usable nickname
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Default REST API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Default public URL of the web front-end (used for share links)
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Session poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Stats refresh interval in seconds (5 minutes)
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 300;

/// Per-request HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Local storage keys
pub const CLIENT_ID_KEY: &str = "clientId";
pub const OWNER_KEY_PREFIX: &str = "isOwner_";
pub const QUESTIONS_KEY_PREFIX: &str = "questions_";
pub const UPVOTED_KEY_PREFIX: &str = "upvoted_";

pub fn owner_key(slug: &SessionSlug) -> String {
    format!("{OWNER_KEY_PREFIX}{slug}")
}

pub fn questions_key(slug: &SessionSlug) -> String {
    format!("{QUESTIONS_KEY_PREFIX}{slug}")
}

pub fn upvoted_key(slug: &SessionSlug) -> String {
    format!("{UPVOTED_KEY_PREFIX}{slug}")
}
