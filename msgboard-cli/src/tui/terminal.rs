//! Terminal management and main run loop
//!
//! Store calls run on spawned tasks and report back over a channel, so the
//! screen keeps drawing while requests are in flight.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use msgboard_core::store::Endpoints;
use msgboard_core::{execute as run_request, Completion, Identity, MediaAttachment, MessageStore, Request};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use super::app::App;
use super::event::{handle_key, poll_event, HandleResult};
use super::ui;

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Sends store requests off to tasks
struct Dispatcher {
    store: Arc<dyn MessageStore>,
    completions: UnboundedSender<Completion>,
}

impl Dispatcher {
    fn dispatch(&self, request: Request) {
        debug!(operation = %request.operation(), "dispatching");
        let store = Arc::clone(&self.store);
        let completions = self.completions.clone();

        tokio::spawn(async move {
            let completion = run_request(store.as_ref(), request).await;
            // Receiver gone means the view has quit
            let _ = completions.send(completion);
        });
    }
}

/// Run the TUI application
pub async fn run(store: Arc<dyn MessageStore>, endpoints: Endpoints, identity: Identity) -> Result<()> {
    info!(user = %identity, endpoint = %endpoints.base(), "opening board view");

    let mut terminal = init_terminal()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher {
        store,
        completions: tx,
    };

    let mut app = App::new(identity, endpoints);
    if let Some(request) = app.board.mount() {
        dispatcher.dispatch(request);
    }

    // Main event loop
    let result = run_loop(&mut terminal, &mut app, &dispatcher, &mut rx).await;

    // Late completions are dropped from here on
    app.board.unmount();
    rx.close();

    // Restore terminal (even if loop failed)
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop
async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    completions: &mut UnboundedReceiver<Completion>,
) -> Result<()> {
    loop {
        // Fold in everything that finished since the last frame
        while let Ok(completion) = completions.try_recv() {
            apply_completion(app, dispatcher, completion);
        }

        // Render UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events (with 50ms timeout for responsive UI)
        let event = tokio::task::block_in_place(|| poll_event(Duration::from_millis(50)))?;
        if let Some(Event::Key(key)) = event {
            match handle_key(app, key) {
                HandleResult::Quit => break,
                HandleResult::Continue => {}
                HandleResult::Dispatch(request) => dispatcher.dispatch(request),
                HandleResult::AttachMedia(path) => attach_media(app, path).await,
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn apply_completion(app: &mut App, dispatcher: &Dispatcher, completion: Completion) {
    if let Some(err) = completion.error() {
        app.set_status(err.to_string());
    }

    if let Some(follow_up) = app.board.complete(completion) {
        dispatcher.dispatch(follow_up);
    }
    app.clamp_selection();
}

async fn attach_media(app: &mut App, path: PathBuf) {
    match MediaAttachment::from_path(&path).await {
        Ok(media) => {
            app.set_status(format!(
                "Attached {} ({}, {} bytes)",
                media.file_name,
                media.kind(),
                media.bytes.len()
            ));
            app.board.compose_mut().media = Some(media);
        }
        Err(err) => app.set_status(err.to_string()),
    }
}
