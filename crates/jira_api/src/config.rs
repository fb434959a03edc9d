use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

pub const DEFAULT_API_VERSION: &str = "3";
pub const DEFAULT_USER_AGENT: &str = "jira-timesheet";
pub const DEFAULT_COOLDOWN_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for a single Jira Cloud site.
#[derive(Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub api_version: String,
    pub username: String,
    pub api_token: String,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    /// Builds a config for `https://<domain>` using basic auth credentials.
    pub fn new(
        domain: impl AsRef<str>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: site_url(domain.as_ref()),
            api_version: DEFAULT_API_VERSION.to_string(),
            username: username.into(),
            api_token: api_token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    /// Root of the REST API, always ending with a slash.
    pub fn api_root(&self) -> String {
        format!(
            "{}/rest/api/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }

    /// Value for the `Authorization` header: `Basic base64(username:token)`.
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.username, self.api_token);
        format!("Basic {}", BASE64_STANDARD.encode(raw))
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("cooldown", &self.cooldown)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn site_url(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
