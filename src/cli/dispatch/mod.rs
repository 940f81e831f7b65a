use crate::cli::{
    actions::{
        account::{self, AccountOp},
        chat, Action,
    },
    commands::{account as account_cmd, chat as chat_cmd},
    globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::from_matches(matches)?;

    let (name, sub_m) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    let credentials = || -> Result<(String, SecretString)> {
        let email = sub_m
            .get_one::<String>(account_cmd::ARG_EMAIL)
            .cloned()
            .context("missing required argument: --email")?;
        let password = sub_m
            .get_one::<String>(account_cmd::ARG_PASSWORD)
            .cloned()
            .context("missing required argument: --password")?;
        Ok((email, SecretString::from(password)))
    };

    let op = match name {
        account_cmd::CMD_SIGNIN => {
            let (email, password) = credentials()?;
            AccountOp::SignIn { email, password }
        }
        account_cmd::CMD_REGISTER => {
            let (email, password) = credentials()?;
            AccountOp::Register { email, password }
        }
        account_cmd::CMD_VERIFY_OTP => AccountOp::VerifyOtp {
            code: sub_m
                .get_one::<String>(account_cmd::ARG_CODE)
                .cloned()
                .context("missing required argument: <code>")?,
        },
        account_cmd::CMD_REFRESH => AccountOp::Refresh,
        account_cmd::CMD_LOGOUT => AccountOp::Logout,
        account_cmd::CMD_PROFILE => AccountOp::Profile,
        chat_cmd::CMD_CHAT => {
            return Ok(Action::Chat(chat::Args {
                globals,
                api_key: sub_m
                    .get_one::<String>(chat_cmd::ARG_API_KEY)
                    .filter(|key| !key.trim().is_empty())
                    .map(|key| SecretString::from(key.clone())),
            }));
        }
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(Action::Account(account::Args { globals, op }))
}
