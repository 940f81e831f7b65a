use crate::{
    app_lib::KeyValueStore,
    cli::{
        actions::account::{render_account, render_logout},
        globals::GlobalArgs,
    },
    features::{
        auth::AuthOrchestrator,
        chat::{store_api_key, CompletionClient, Conversation},
    },
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const CMD_PROFILE: &str = "/profile";
const CMD_LOGOUT: &str = "/logout";
const CMD_QUIT: &str = "/quit";

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub api_key: Option<SecretString>,
}

/// Execute the interactive chat on stdin/stdout.
/// # Errors
/// Returns an error if no completion key is available or stdin cannot be read.
pub async fn execute(args: Args) -> Result<()> {
    let storage = args.globals.open_storage()?;

    if let Some(api_key) = &args.api_key {
        store_api_key(&*storage, api_key).context("could not save the API key")?;
    }

    let config = args.globals.config();
    let client = CompletionClient::from_storage(&config, &*storage)
        .context("pass --api-key or set CHATGATE_COMPLETION_API_KEY")?;
    let orchestrator = args.globals.orchestrator(storage)?;

    if has_session(&**orchestrator.gateway().storage()) {
        if let Err(failure) = orchestrator.fetch_profile().await {
            debug!("profile unavailable: {failure}");
        }
    }

    let stdin = BufReader::new(tokio::io::stdin());
    run(&orchestrator, &client, stdin, &mut std::io::stdout()).await
}

fn has_session(storage: &dyn KeyValueStore) -> bool {
    matches!(storage.get(crate::app_lib::storage::ACCESS_TOKEN_KEY), Ok(Some(token)) if !token.is_empty())
}

/// Reads one message per line until EOF, `/quit` or `/logout`.
/// # Errors
/// Returns an error if reading input or writing output fails. Completion
/// failures are printed and the loop continues.
pub async fn run<R, W>(
    orchestrator: &AuthOrchestrator,
    client: &CompletionClient,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut conversation = Conversation::new();
    if let Some(greeting) = conversation.messages().first() {
        writeln!(out, "assistant> {}", greeting.content)?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            CMD_QUIT => break,
            CMD_PROFILE => match orchestrator.profile().snapshot().account {
                Some(account) => render_account(out, &account)?,
                None => writeln!(out, "Not signed in.")?,
            },
            CMD_LOGOUT => {
                render_logout(out, &orchestrator.logout().await)?;
                break;
            }
            text => match conversation.send(client, text).await {
                Ok(Some(reply)) => writeln!(out, "assistant> {}", reply.content)?,
                Ok(None) => {}
                Err(err) => {
                    warn!("completion failed: {err}");
                    writeln!(out, "error> {err}")?;
                }
            },
        }
        out.flush()?;
    }

    Ok(())
}
