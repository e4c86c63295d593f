//! msgboard CLI - a client for a shared message board
//!
//! One-shot commands print the board (or one message's comments) after each
//! action; `msgboard tui` opens the interactive view.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;
mod tui;

use commands::board::ConnectionArgs;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "msgboard",
    author,
    version,
    about = "Post, vote on and comment on messages in a shared board",
    long_about = "Talks to a message board service over REST. Every action is followed by a \
                  fresh read of the board, so what you see is what the service holds."
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every message on the board
    List(commands::board::ListArgs),
    /// Post a new message, optionally with an image or video
    Post(commands::board::PostArgs),
    /// Delete a message
    Delete(commands::board::TargetArgs),
    /// Upvote a message
    Upvote(commands::board::TargetArgs),
    /// Downvote a message
    Downvote(commands::board::TargetArgs),
    /// Comment on a message
    Comment(commands::board::CommentArgs),
    /// Show the comments on a message
    Comments(commands::board::TargetArgs),
    /// Open the interactive board view
    Tui,
    /// Manage msgboard configuration (init, path, show)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_file = matches!(cli.command, Commands::Tui)
        .then(|| msgboard_core::config::BoardConfig::config_dir().join("msgboard.log"));
    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        log_file,
    })
    .ok();

    match cli.command {
        Commands::List(args) => commands::run_list(&cli.connection, args).await?,
        Commands::Post(args) => commands::run_post(&cli.connection, args).await?,
        Commands::Delete(args) => commands::run_delete(&cli.connection, args).await?,
        Commands::Upvote(args) => commands::run_upvote(&cli.connection, args).await?,
        Commands::Downvote(args) => commands::run_downvote(&cli.connection, args).await?,
        Commands::Comment(args) => commands::run_comment(&cli.connection, args).await?,
        Commands::Comments(args) => commands::run_comments(&cli.connection, args).await?,
        Commands::Tui => commands::run_tui(&cli.connection).await?,
        Commands::Config(args) => config::run_config(args)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
