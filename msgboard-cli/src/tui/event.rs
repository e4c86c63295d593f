//! Event handling for the TUI

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use msgboard_core::{Request, Result as BoardResult};

use super::app::{App, Mode};

/// Poll for events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Result of handling a key event
#[derive(Debug, PartialEq, Eq)]
pub enum HandleResult {
    /// Continue running
    Continue,
    /// Quit the application
    Quit,
    /// Run this request against the store
    Dispatch(Request),
    /// Read this file into the compose draft
    AttachMedia(PathBuf),
}

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> HandleResult {
    // Global quit shortcuts (Ctrl+C, Ctrl+Q)
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => return HandleResult::Quit,
            _ => {}
        }
    }

    // Mode-specific handling
    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Compose => handle_compose_mode(app, key),
        Mode::Media => handle_media_mode(app, key),
        Mode::Comment => handle_comment_mode(app, key),
    }
}

/// Turn a guarded intent into a dispatch, or report why it was refused
fn dispatch(app: &mut App, request: BoardResult<Request>) -> HandleResult {
    match request {
        Ok(request) => HandleResult::Dispatch(request),
        Err(err) => {
            app.set_status(err.to_string());
            HandleResult::Continue
        }
    }
}

fn dispatch_optional(request: Option<Request>) -> HandleResult {
    request.map_or(HandleResult::Continue, HandleResult::Dispatch)
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    match key.code {
        // Quit
        KeyCode::Char('q') => HandleResult::Quit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            HandleResult::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            HandleResult::Continue
        }

        // Per-message actions
        KeyCode::Char(c @ ('u' | 'd' | 'x' | 'c')) => {
            let Some(id) = app.selected_id() else {
                app.set_status("No message selected");
                return HandleResult::Continue;
            };
            match c {
                'u' => {
                    let request = app.board.begin_upvote(&id);
                    dispatch(app, request)
                }
                'd' => {
                    let request = app.board.begin_downvote(&id);
                    dispatch(app, request)
                }
                'x' => {
                    let request = app.board.begin_delete(&id);
                    dispatch(app, request)
                }
                _ => dispatch_optional(app.board.toggle_comments(&id)),
            }
        }

        // Drafts
        KeyCode::Char('a') => {
            if !app.enter_comment() {
                app.set_status("No message selected");
            }
            HandleResult::Continue
        }
        KeyCode::Char('i') => {
            app.enter_compose();
            HandleResult::Continue
        }
        KeyCode::Char('m') => {
            app.enter_media();
            HandleResult::Continue
        }

        // Submit the compose draft
        KeyCode::Enter => {
            let request = app.board.begin_submit();
            dispatch(app, request)
        }

        // Refresh
        KeyCode::Char('r') => dispatch_optional(app.board.request_refresh()),

        KeyCode::Esc => {
            app.clear_status();
            HandleResult::Continue
        }

        _ => HandleResult::Continue,
    }
}

/// Handle keys while typing the compose description
fn handle_compose_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Esc => {
            app.exit_mode();
            HandleResult::Continue
        }
        KeyCode::Enter => {
            app.exit_mode();
            let request = app.board.begin_submit();
            dispatch(app, request)
        }
        KeyCode::Backspace => {
            app.input_backspace();
            HandleResult::Continue
        }
        KeyCode::Char(c) => {
            app.input_insert(c);
            HandleResult::Continue
        }
        _ => HandleResult::Continue,
    }
}

/// Handle keys while typing a media path
fn handle_media_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Esc => {
            app.exit_mode();
            HandleResult::Continue
        }
        KeyCode::Enter => {
            let path = app.media_input.trim().to_string();
            app.exit_mode();
            if path.is_empty() {
                // Empty path detaches
                app.board.compose_mut().media = None;
                app.set_status("Attachment removed");
                HandleResult::Continue
            } else {
                HandleResult::AttachMedia(PathBuf::from(path))
            }
        }
        KeyCode::Backspace => {
            app.input_backspace();
            HandleResult::Continue
        }
        KeyCode::Char(c) => {
            app.input_insert(c);
            HandleResult::Continue
        }
        _ => HandleResult::Continue,
    }
}

/// Handle keys while typing a comment
fn handle_comment_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Esc => {
            app.exit_mode();
            HandleResult::Continue
        }
        KeyCode::Enter => {
            let target = app.comment_target.clone();
            app.exit_mode();
            match target {
                Some(id) => {
                    let request = app.board.begin_add_comment(&id);
                    dispatch(app, request)
                }
                None => HandleResult::Continue,
            }
        }
        KeyCode::Backspace => {
            app.input_backspace();
            HandleResult::Continue
        }
        KeyCode::Char(c) => {
            app.input_insert(c);
            HandleResult::Continue
        }
        _ => HandleResult::Continue,
    }
}
