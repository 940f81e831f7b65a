//! HTTP helpers for JSON APIs with consistent timeouts and error handling. Feature
//! clients use these helpers to avoid duplicating request setup and to enforce a
//! predictable timeout policy. The helpers do not store secrets or tokens; they only
//! attach the bearer credential provided by callers.

use super::{config::AppConfig, errors::AppError};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Credentialed JSON transport bound to a single base URL.
///
/// The underlying client keeps a cookie store so cookie-based sessions
/// survive between calls made through the same instance.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: &str, config: &AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns an error on encoding, transport, non-2xx or decoding failures.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_url_with_base(&self.base_url, path);
        let payload = serde_json::to_vec(body)
            .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;

        let builder = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);

        let response = send(with_bearer(builder, bearer), "POST", &url).await?;

        handle_json_response(response).await
    }

    /// Fetches JSON.
    ///
    /// # Errors
    /// Returns an error on transport, non-2xx or decoding failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> Result<T, AppError> {
        let url = build_url_with_base(&self.base_url, path);
        let builder = self.client.get(&url);

        let response = send(with_bearer(builder, bearer), "GET", &url).await?;

        handle_json_response(response).await
    }
}

fn with_bearer(builder: RequestBuilder, bearer: Option<&SecretString>) -> RequestBuilder {
    match bearer {
        Some(token) => builder.bearer_auth(token.expose_secret()),
        None => builder,
    }
}

async fn send(builder: RequestBuilder, method: &'static str, url: &str) -> Result<Response, AppError> {
    let span = info_span!("http.request", http.method = method, url = %url);

    builder
        .send()
        .instrument(span)
        .await
        .map_err(map_request_error)
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps network errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with the server-provided reason.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "request rejected");

        Err(AppError::Http {
            status: status.as_u16(),
            message: error_reason(&body),
        })
    }
}

/// Extracts `message` (or `error`) from a JSON error body. Anything else yields
/// an empty reason so callers fall back to their own wording.
pub(crate) fn error_reason(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };

    ["message", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(Value::as_str))
        .map(sanitize_reason)
        .unwrap_or_default()
}

/// Trims and truncates server reasons before they reach the user.
fn sanitize_reason(reason: &str) -> String {
    reason.trim().chars().take(MAX_ERROR_CHARS).collect()
}
