//! In-memory chat transcript. The assistant greets first; each non-empty user
//! input is appended and answered by the completion client.

use crate::{
    app_lib::AppError,
    features::chat::{client::CompletionClient, types::Message},
};

pub const GREETING: &str = "Hello! I'm your shopping assistant. How can I help you today?";

#[derive(Clone, Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    loading: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            loading: false,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Appends the trimmed input and the assistant reply. Blank input is ignored.
    /// On failure the user message stays in the transcript.
    ///
    /// # Errors
    /// Returns the completion client's error.
    pub async fn send(
        &mut self,
        client: &CompletionClient,
        input: &str,
    ) -> Result<Option<Message>, AppError> {
        let content = input.trim();
        if content.is_empty() {
            return Ok(None);
        }

        self.messages.push(Message::user(content));
        self.loading = true;
        let result = client.complete(&self.messages).await;
        self.loading = false;

        let reply = Message::assistant(result?);
        self.messages.push(reply.clone());

        Ok(Some(reply))
    }
}
