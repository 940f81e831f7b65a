use clap::{Arg, Command};

pub const CMD_CHAT: &str = "chat";
pub const ARG_API_KEY: &str = "api-key";

#[must_use]
pub fn subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new(CMD_CHAT)
            .about("Chat with the assistant (reads messages from stdin)")
            .long_about(
                "Chat with the assistant. Each stdin line is sent as a message. \
                 Type /profile to show the account or /logout to sign out and quit.",
            )
            .arg(
                Arg::new(ARG_API_KEY)
                    .long("api-key")
                    .help("Completion API key; stored locally for later sessions")
                    .env("CHATGATE_COMPLETION_API_KEY")
                    .hide_env_values(true),
            ),
    )
}
