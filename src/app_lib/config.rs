//! Client configuration for the account API and the completion endpoint.
//! Values are public endpoints and tuning knobs; the completion API key is
//! never part of this struct and lives in local storage instead.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://cruiseapi.pendeet.com/api/v2";
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
/// Default request timeout applied to every HTTP call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub completion_base_url: String,
    pub completion_model: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            completion_base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: APP_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_completion_base_url(mut self, url: impl Into<String>) -> Self {
        self.completion_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.request_timeout = Duration::from_secs(seconds);
        self
    }

    /// Replaces blank values with defaults and strips trailing slashes from base URLs.
    #[must_use]
    pub fn normalize(self) -> Self {
        let api_base_url = normalize_value(&self.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let completion_base_url = normalize_value(&self.completion_base_url)
            .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string());
        let completion_model = normalize_value(&self.completion_model)
            .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string());
        let request_timeout = if self.request_timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.request_timeout
        };
        let user_agent =
            normalize_value(&self.user_agent).unwrap_or_else(|| APP_USER_AGENT.to_string());

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            completion_base_url: completion_base_url.trim_end_matches('/').to_string(),
            completion_model,
            request_timeout,
            user_agent,
        }
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
