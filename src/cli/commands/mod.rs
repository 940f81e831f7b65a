pub mod account;
pub mod chat;
pub mod logging;

use crate::app_lib::config::{
    DEFAULT_API_BASE_URL, DEFAULT_COMPLETION_BASE_URL, DEFAULT_COMPLETION_MODEL,
};
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_COMPLETION_URL: &str = "completion-url";
pub const ARG_COMPLETION_MODEL: &str = "completion-model";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("chatgate")
        .about("Account session client and chat assistant")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Account API base URL")
                .default_value(DEFAULT_API_BASE_URL)
                .env("CHATGATE_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long("state-file")
                .help("Where session tokens are kept (default: <data dir>/chatgate/session.json)")
                .env("CHATGATE_STATE_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("10")
                .env("CHATGATE_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        )
        .arg(
            Arg::new(ARG_COMPLETION_URL)
                .long("completion-url")
                .help("OpenAI-compatible completion base URL")
                .default_value(DEFAULT_COMPLETION_BASE_URL)
                .env("CHATGATE_COMPLETION_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_COMPLETION_MODEL)
                .long("completion-model")
                .help("Completion model name")
                .default_value(DEFAULT_COMPLETION_MODEL)
                .env("CHATGATE_COMPLETION_MODEL")
                .global(true),
        );

    let command = account::subcommands(command);
    let command = chat::subcommand(command);

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "chatgate");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Account session client and chat assistant"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_signin_args() {
        temp_env::with_vars(
            [
                ("CHATGATE_EMAIL", None::<&str>),
                ("CHATGATE_PASSWORD", None),
                ("CHATGATE_API_URL", None),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "chatgate",
                    "signin",
                    "--email",
                    "a@b.com",
                    "--password",
                    "pw",
                ]);

                let (name, sub) = matches.subcommand().unwrap();
                assert_eq!(name, account::CMD_SIGNIN);
                assert_eq!(
                    sub.get_one::<String>(account::ARG_EMAIL).map(String::as_str),
                    Some("a@b.com")
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some(DEFAULT_API_BASE_URL)
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(10));
            },
        );
    }

    #[test]
    fn test_signin_requires_password() {
        temp_env::with_vars([("CHATGATE_PASSWORD", None::<&str>)], || {
            let result =
                new().try_get_matches_from(vec!["chatgate", "signin", "--email", "a@b.com"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("CHATGATE_API_URL", Some("http://localhost:3000/api/v2")),
                ("CHATGATE_STATE_FILE", Some("/tmp/chatgate.json")),
                ("CHATGATE_TIMEOUT", Some("3")),
                ("CHATGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["chatgate", "verify-otp", "0719"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some("http://localhost:3000/api/v2")
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_STATE_FILE).map(String::as_str),
                    Some("/tmp/chatgate.json")
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(3));
                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .map(|s| *s),
                    Some(2)
                );

                let (_, sub) = matches.subcommand().unwrap();
                assert_eq!(
                    sub.get_one::<String>(account::ARG_CODE).map(String::as_str),
                    Some("0719")
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("CHATGATE_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["chatgate", "profile"]);
                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5usize {
            temp_env::with_vars([("CHATGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["chatgate".to_string(), "logout".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_timeout_out_of_range() {
        temp_env::with_vars([("CHATGATE_TIMEOUT", None::<&str>)], || {
            let result = new().try_get_matches_from(vec!["chatgate", "--timeout", "0", "refresh"]);
            assert!(result.is_err());
        });
    }
}
