//! Board commands - talk to the message service via its REST API
//!
//! Commands: list, post, delete, upvote, downvote, comment, comments, tui
//!
//! Every command mounts a fresh board, performs its one action through the
//! board state machine and prints what the service holds afterwards.
//!
//! ```bash
//! msgboard post -m "lunch?" --media ./menu.png
//! msgboard list --json | jq '.messages[] | {id, author, upvotes}'
//! ```

use std::collections::BTreeSet;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, ValueEnum};
use msgboard_core::config::{BoardConfig, StoreConfig};
use msgboard_core::models::MessageId;
use msgboard_core::store::Endpoints;
use msgboard_core::{
    render, render_text, BoardController, BoardView, Comment, CommentPanel, HttpMessageStore, Identity,
    MediaAttachment,
};

// ============================================================================
// Shared Args
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Message service base URL (default: http://localhost:8800)
    #[arg(long, env = "MSGBOARD_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Username to act as
    #[arg(long, env = "MSGBOARD_USERNAME", global = true)]
    pub username: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (for piping to jq)
    Json,
    /// Quiet mode - IDs only
    Quiet,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, short, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long, conflicts_with = "output")]
    pub json: bool,

    /// Shorthand for --output quiet
    #[arg(long, short, conflicts_with = "output")]
    pub quiet: bool,
}

impl OutputArgs {
    fn format(&self) -> OutputFormat {
        get_output_format(self.output, self.json, self.quiet)
    }
}

// ============================================================================
// Command Args
// ============================================================================

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct TargetArgs {
    /// Message ID
    pub id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct PostArgs {
    /// Inline message text
    #[arg(long, short)]
    pub message: Option<String>,

    /// Read message text from file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Image or video to attach (.mp4 plays as video)
    #[arg(long)]
    pub media: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct CommentArgs {
    /// Message ID to comment on
    pub id: String,

    /// Inline comment text
    #[arg(long, short)]
    pub message: Option<String>,

    /// Read comment text from file
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

// ============================================================================
// Config Resolution
// ============================================================================

/// Everything needed to reach the service as someone
#[derive(Debug, Clone)]
pub struct Connection {
    pub store: StoreConfig,
    pub identity: Identity,
}

/// Resolve flags against the config file
pub fn connect(args: &ConnectionArgs) -> Result<Connection> {
    let config = BoardConfig::load_or_default()?;
    resolve(args, config)
}

fn resolve(args: &ConnectionArgs, config: BoardConfig) -> Result<Connection> {
    let BoardConfig { mut store, session } = config;

    // Priority: flag/env > config.toml > default
    if let Some(ref endpoint) = args.endpoint {
        store.endpoint = endpoint.clone();
    }
    store.insecure |= args.insecure;
    if args.timeout.is_some() {
        store.request_timeout_secs = args.timeout;
    }

    // Priority: flag/env > config.toml > error; blank counts as unset
    let username = args
        .username
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or(session.username.filter(|name| !name.trim().is_empty()))
        .ok_or_else(|| {
            anyhow!(
                "Username required. Use --username, MSGBOARD_USERNAME env var, or set [session].username in {}",
                BoardConfig::config_path().display()
            )
        })?;

    Ok(Connection {
        store,
        identity: Identity::new(username),
    })
}

fn get_output_format(output: OutputFormat, json_flag: bool, quiet_flag: bool) -> OutputFormat {
    if json_flag {
        OutputFormat::Json
    } else if quiet_flag {
        OutputFormat::Quiet
    } else {
        output
    }
}

/// Open a mounted board against the HTTP store
async fn open_board(args: &ConnectionArgs) -> Result<(BoardController, Endpoints)> {
    let connection = connect(args)?;
    let store = HttpMessageStore::new(&connection.store).context("Failed to build HTTP client")?;
    let endpoints = store.endpoints().clone();

    let mut board = BoardController::new(Arc::new(store), connection.identity);
    board
        .mount()
        .await
        .with_context(|| format!("Failed to load the board from {}", endpoints.base()))?;

    Ok((board, endpoints))
}

// ============================================================================
// Content Resolution (stdin/file/inline)
// ============================================================================

fn get_content(message: &Option<String>, file: &Option<PathBuf>) -> Result<Option<String>> {
    // Priority: -m inline > --file > stdin
    if let Some(msg) = message {
        return Ok(Some(msg.clone()));
    }

    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read file: {}", path.display()));
    }

    // Check if stdin has data (not a TTY)
    if !std::io::stdin().is_terminal() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;

        let content = buf.trim().to_string();
        if !content.is_empty() {
            return Ok(Some(content));
        }
    }

    Ok(None)
}

fn no_content(context: &str) -> anyhow::Error {
    anyhow!(
        "No content provided for {}. Use -m, --file, or pipe content via stdin",
        context
    )
}

// ============================================================================
// Output
// ============================================================================

fn print_board(board: &BoardController, endpoints: &Endpoints, format: OutputFormat) -> Result<()> {
    let view = render(board.state(), endpoints);
    print_view(&view, format)
}

fn print_view(view: &BoardView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(view)?);
        }
        OutputFormat::Quiet => {
            for message in &view.messages {
                println!("{}", message.id);
            }
        }
        OutputFormat::Human => {
            print!("{}", render_text(view));
        }
    }
    Ok(())
}

fn message_ids(board: &BoardController) -> BTreeSet<MessageId> {
    board
        .state()
        .messages()
        .iter()
        .map(|message| message.id.clone())
        .collect()
}

// ============================================================================
// Command Implementations
// ============================================================================

pub async fn run_list(conn: &ConnectionArgs, args: ListArgs) -> Result<()> {
    let (board, endpoints) = open_board(conn).await?;
    print_board(&board, &endpoints, args.output.format())
}

pub async fn run_post(conn: &ConnectionArgs, args: PostArgs) -> Result<()> {
    let description = get_content(&args.message, &args.file)?;
    if description.is_none() && args.media.is_none() {
        return Err(no_content("post"));
    }

    let media = match args.media {
        Some(ref path) => Some(MediaAttachment::from_path(path).await?),
        None => None,
    };

    let (mut board, endpoints) = open_board(conn).await?;
    let before = message_ids(&board);

    let draft = board.state_mut().compose_mut();
    draft.description = description.unwrap_or_default();
    draft.media = media;

    board.submit().await.context("Failed to post message")?;

    match args.output.format() {
        OutputFormat::Quiet => {
            // New ids only, so scripts can capture what they created
            for id in message_ids(&board).difference(&before) {
                println!("{}", id);
            }
            Ok(())
        }
        format => print_board(&board, &endpoints, format),
    }
}

pub async fn run_delete(conn: &ConnectionArgs, args: TargetArgs) -> Result<()> {
    let (mut board, endpoints) = open_board(conn).await?;
    let id = MessageId::from(args.id);

    board
        .delete(&id)
        .await
        .with_context(|| format!("Failed to delete message {}", id))?;

    print_board(&board, &endpoints, args.output.format())
}

pub async fn run_upvote(conn: &ConnectionArgs, args: TargetArgs) -> Result<()> {
    let (mut board, endpoints) = open_board(conn).await?;
    let id = MessageId::from(args.id);

    board
        .upvote(&id)
        .await
        .with_context(|| format!("Failed to upvote message {}", id))?;

    print_board(&board, &endpoints, args.output.format())
}

pub async fn run_downvote(conn: &ConnectionArgs, args: TargetArgs) -> Result<()> {
    let (mut board, endpoints) = open_board(conn).await?;
    let id = MessageId::from(args.id);

    board
        .downvote(&id)
        .await
        .with_context(|| format!("Failed to downvote message {}", id))?;

    print_board(&board, &endpoints, args.output.format())
}

pub async fn run_comment(conn: &ConnectionArgs, args: CommentArgs) -> Result<()> {
    let text = get_content(&args.message, &args.file)?.ok_or_else(|| no_content("comment"))?;

    let (mut board, endpoints) = open_board(conn).await?;
    let id = MessageId::from(args.id);

    board.state_mut().set_comment_draft(&id, text);
    board
        .add_comment(&id)
        .await
        .with_context(|| format!("Failed to comment on message {}", id))?;

    print_board(&board, &endpoints, args.output.format())
}

pub async fn run_comments(conn: &ConnectionArgs, args: TargetArgs) -> Result<()> {
    let (mut board, _endpoints) = open_board(conn).await?;
    let id = MessageId::from(args.id);

    board
        .toggle_comments(&id)
        .await
        .with_context(|| format!("Failed to fetch comments for message {}", id))?;

    let comments: &[Comment] = match board.state().panel(&id) {
        CommentPanel::Expanded(comments) => comments.as_slice(),
        _ => &[],
    };

    match args.output.format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(comments)?);
        }
        OutputFormat::Quiet => {
            println!("{}", comments.len());
        }
        OutputFormat::Human => {
            println!("┌─ comments on {} ({})", id, comments.len());
            println!("│");

            if comments.is_empty() {
                println!("└─ (no comments)");
            } else {
                for (i, comment) in comments.iter().enumerate() {
                    let prefix = if i == comments.len() - 1 { "└─" } else { "├─" };
                    println!("{} {}: {}", prefix, comment.author, comment.text);
                }
            }
        }
    }

    Ok(())
}

pub async fn run_tui(conn: &ConnectionArgs) -> Result<()> {
    let connection = connect(conn)?;
    let store = HttpMessageStore::new(&connection.store).context("Failed to build HTTP client")?;
    let endpoints = store.endpoints().clone();

    crate::tui::run(Arc::new(store), endpoints, connection.identity).await
}
