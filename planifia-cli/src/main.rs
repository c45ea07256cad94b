use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod analyzer;
mod config;
mod reminders_cmd;
mod session;
mod sink;
mod state;
mod tasks_cmd;

#[derive(Parser, Debug)]
#[command(name = "planifia", version, about = "Smart reminders for your top-priority tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.planifia/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Start a session; reminders are only planned for a logged-in user
    Login {
        #[arg(long)]
        user: String,
    },

    /// End the current session
    Logout,

    /// Edit the prioritized task list
    Tasks {
        #[command(subcommand)]
        command: tasks_cmd::TasksCommand,
    },

    /// Plan and deliver reminders
    Reminders {
        #[command(subcommand)]
        command: reminders_cmd::RemindersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Show the effective reminder settings
    Check,
}

/// Log filter comes from `PLANIFIA_LOG` (default: info).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PLANIFIA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Check => config::config_check()?,
        },
        Command::Login { user } => session::login(&user)?,
        Command::Logout => session::logout()?,
        Command::Tasks { command } => tasks_cmd::run(command)?,
        Command::Reminders { command } => reminders_cmd::run(command).await?,
    }

    Ok(())
}
