//! Client for an OpenAI-compatible chat completion endpoint. The bearer key is
//! supplied by the end user, kept in local storage, and only ever sent to the
//! completion base URL; the account gateway never reads it.

use crate::{
    app_lib::{storage::COMPLETION_API_KEY, ApiClient, AppConfig, AppError, KeyValueStore},
    features::chat::types::{CompletionMessage, CompletionRequest, CompletionResponse, Message},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

pub const COMPLETIONS_PATH: &str = "/chat/completions";

pub struct CompletionClient {
    api: ApiClient,
    model: String,
    api_key: SecretString,
}

impl CompletionClient {
    /// # Errors
    /// Returns `AppError::Config` if the key is blank or the HTTP client cannot be built.
    pub fn new(config: &AppConfig, api_key: SecretString) -> Result<Self, AppError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(AppError::Config(
                "Completion API key is not configured.".to_string(),
            ));
        }

        let api = ApiClient::new(&config.completion_base_url, config)?;

        Ok(Self {
            api,
            model: config.completion_model.clone(),
            api_key,
        })
    }

    /// Builds a client from the key previously saved with [`store_api_key`].
    ///
    /// # Errors
    /// Returns `AppError::Config` when no key is stored, or the storage error.
    pub fn from_storage(config: &AppConfig, storage: &dyn KeyValueStore) -> Result<Self, AppError> {
        let key = storage.get(COMPLETION_API_KEY)?.unwrap_or_default();
        Self::new(config, SecretString::from(key))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the conversation history and returns the first choice's text.
    ///
    /// # Errors
    /// Returns transport, HTTP or decoding errors, or `AppError::Parse` for an empty reply.
    #[instrument(skip_all, fields(model = %self.model, messages = history.len()))]
    pub async fn complete(&self, history: &[Message]) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: history
                .iter()
                .map(|message| CompletionMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
        };

        let response: CompletionResponse = self
            .api
            .post_json(COMPLETIONS_PATH, &request, Some(&self.api_key))
            .await?;

        let content = response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Parse("Completion response had no content".to_string()))?;

        debug!(chars = content.len(), "completion received");

        Ok(content)
    }
}

/// Saves a user-supplied completion key locally.
///
/// # Errors
/// Returns `AppError::Config` for a blank key, or the storage error.
pub fn store_api_key(storage: &dyn KeyValueStore, api_key: &SecretString) -> Result<(), AppError> {
    let key = api_key.expose_secret().trim();
    if key.is_empty() {
        return Err(AppError::Config(
            "Completion API key is not configured.".to_string(),
        ));
    }
    storage.set(COMPLETION_API_KEY, key)
}
