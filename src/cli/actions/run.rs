use crate::cli::actions::{account, chat, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point; a new `Action::*` variant needs a matching arm here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Account(args) => account::execute(args).await,
        Action::Chat(args) => chat::execute(args).await,
    }
}
