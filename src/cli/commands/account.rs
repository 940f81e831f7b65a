use clap::{Arg, Command};

pub const CMD_SIGNIN: &str = "signin";
pub const CMD_REGISTER: &str = "register";
pub const CMD_VERIFY_OTP: &str = "verify-otp";
pub const CMD_REFRESH: &str = "refresh";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_PROFILE: &str = "profile";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_CODE: &str = "code";

fn credentials(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Account email address")
                .env("CHATGATE_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help("Account password")
                .env("CHATGATE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn subcommands(command: Command) -> Command {
    command
        .subcommand(credentials(
            Command::new(CMD_SIGNIN).about("Sign in and store the session tokens"),
        ))
        .subcommand(credentials(
            Command::new(CMD_REGISTER).about("Create an account; a 4-digit code is emailed"),
        ))
        .subcommand(
            Command::new(CMD_VERIFY_OTP)
                .about("Verify the pending registration with the emailed code")
                .arg(
                    Arg::new(ARG_CODE)
                        .help("4-digit verification code")
                        .required(true),
                ),
        )
        .subcommand(Command::new(CMD_REFRESH).about("Refresh the access token"))
        .subcommand(Command::new(CMD_LOGOUT).about("Sign out and wipe local session data"))
        .subcommand(Command::new(CMD_PROFILE).about("Show the signed-in account"))
}
