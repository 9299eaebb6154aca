use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use opsbell_bridge::push::PushRequest;
use opsbell_bridge::role::Role;

/// One line typed into the command bar.
#[derive(Debug, Parser)]
#[command(name = "opsbell", no_binary_name = true, disable_version_flag = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Open the destination of notification N
    Open { position: usize },
    /// Remove all notifications
    Clear,
    /// Broadcast a push notification: push [--sunday] <title> | <message>
    Push {
        /// Deliver next Sunday instead of right away
        #[arg(long)]
        sunday: bool,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Reload sent push notifications
    History,
    /// Send a push notification again
    Resend { id: String },
    /// Reload push subscriber stats
    Stats,
    /// Reconnect with another role
    Role {
        #[arg(value_parser = parse_role)]
        role: Role,
        user_id: Option<String>,
    },
    /// Leave opsbell
    #[command(alias = "exit")]
    Quit,
}

fn parse_role(value: &str) -> Result<Role, String> {
    match Role::from(value.to_ascii_lowercase()) {
        Role::Unrecognized(name) => Err(format!("unknown role {name:?}, expected admin or pilot")),
        role => Ok(role),
    }
}

impl Command {
    /// Turns the words of a `push` command into a request. Everything before
    /// the first `|` is the title, everything after it the message; blank
    /// parts are left for the backend to reject.
    pub fn push_request(sunday: bool, words: &[String]) -> PushRequest {
        let text = words.join(" ");
        let (title, body) = text.split_once('|').unwrap_or((text.as_str(), ""));
        PushRequest {
            title: title.trim().to_string(),
            body: body.trim().to_string(),
            schedule_sunday: sunday,
        }
    }
}

/// What the command bar shows for a line that did not yield a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// `help` or `--help`: the full command reference.
    Help(String),
    /// The first line of a usage error.
    Error(String),
}

/// Parses one line of command bar input. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Result<Command, Feedback>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let parsed = CommandLine::try_parse_from(words).map(|line| line.command);
    Some(parsed.map_err(|error| match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Feedback::Help(error.to_string())
        }
        _ => Feedback::Error(
            error
                .to_string()
                .lines()
                .next()
                .unwrap_or("invalid command")
                .to_string(),
        ),
    }))
}
