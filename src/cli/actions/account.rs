use crate::{
    cli::globals::GlobalArgs,
    features::auth::{Account, AuthOrchestrator, LogoutOutcome},
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::io::Write;
use tracing::debug;

#[derive(Debug)]
pub enum AccountOp {
    SignIn {
        email: String,
        password: SecretString,
    },
    Register {
        email: String,
        password: SecretString,
    },
    VerifyOtp {
        code: String,
    },
    Refresh,
    Logout,
    Profile,
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub op: AccountOp,
}

/// Execute an account action against the configured API and state file.
/// # Errors
/// Returns the failure reason recorded on the session or profile store.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Global args: {:?}", args.globals);

    let storage = args.globals.open_storage()?;
    let orchestrator = args.globals.orchestrator(storage)?;

    run(&orchestrator, args.op, &mut std::io::stdout()).await
}

/// Runs one operation and writes the human-readable result to `out`.
/// # Errors
/// Returns the failure reason recorded on the matching store.
pub async fn run<W: Write>(
    orchestrator: &AuthOrchestrator,
    op: AccountOp,
    out: &mut W,
) -> Result<()> {
    match op {
        AccountOp::SignIn { email, password } => {
            if orchestrator.sign_in(&email, &password).await.is_err() {
                return Err(session_error(orchestrator));
            }
            let account = orchestrator.session().snapshot().account;
            if let Some(account) = account {
                writeln!(out, "Signed in.")?;
                render_account(out, &account)?;
            }
        }
        AccountOp::Register { email, password } => {
            match orchestrator.register(&email, &password).await {
                Ok(registration) => {
                    let message = registration.message.as_deref().unwrap_or_default();
                    if !message.is_empty() {
                        writeln!(out, "{message}")?;
                    }
                    writeln!(
                        out,
                        "Registered account {}. Check your email and run `chatgate verify-otp <code>`.",
                        registration.account_id
                    )?;
                }
                Err(_) => return Err(session_error(orchestrator)),
            }
        }
        AccountOp::VerifyOtp { code } => {
            if orchestrator.verify_otp(&code).await.is_err() {
                return Err(session_error(orchestrator));
            }
            writeln!(out, "Verified! You can now sign in.")?;
        }
        AccountOp::Refresh => {
            if orchestrator.refresh().await.is_err() {
                return Err(session_error(orchestrator));
            }
            writeln!(out, "Access token refreshed.")?;
        }
        AccountOp::Logout => render_logout(out, &orchestrator.logout().await)?,
        AccountOp::Profile => {
            if orchestrator.fetch_profile().await.is_err() {
                let reason = orchestrator.profile().snapshot().error.unwrap_or_default();
                return Err(anyhow!(reason));
            }
            if let Some(account) = orchestrator.profile().snapshot().account {
                render_account(out, &account)?;
            }
        }
    }

    Ok(())
}

fn session_error(orchestrator: &AuthOrchestrator) -> anyhow::Error {
    anyhow!(orchestrator.session().snapshot().error.unwrap_or_default())
}

/// Prints the server's logout message, or the warning when only local state was cleared.
/// # Errors
/// Returns an error if writing fails.
pub fn render_logout<W: Write>(out: &mut W, outcome: &LogoutOutcome) -> std::io::Result<()> {
    match outcome {
        LogoutOutcome::Revoked { message } if !message.is_empty() => writeln!(out, "{message}"),
        LogoutOutcome::Revoked { .. } => writeln!(out, "Logged out."),
        LogoutOutcome::LocalOnly { warning } => {
            writeln!(out, "Logged out locally; the server said: {warning}")
        }
    }
}

/// Prints the account fields that are set, one per line.
/// # Errors
/// Returns an error if writing fails.
pub fn render_account<W: Write>(out: &mut W, account: &Account) -> std::io::Result<()> {
    writeln!(out, "Account:  {}", account.account_id)?;
    if let Some(name) = account.name.as_deref().filter(|n| !n.is_empty()) {
        writeln!(out, "Name:     {name}")?;
    }
    if !account.email.is_empty() {
        writeln!(out, "Email:    {}", account.email)?;
    }
    if !account.role.is_empty() {
        writeln!(out, "Role:     {}", account.role)?;
    }
    if !account.account_type.is_empty() {
        writeln!(out, "Type:     {}", account.account_type)?;
    }
    writeln!(
        out,
        "Verified: {}",
        if account.is_verified { "yes" } else { "no" }
    )
}
