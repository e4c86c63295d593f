//! Interactive view state: board state plus selection and input mode

use msgboard_core::models::MessageId;
use msgboard_core::store::Endpoints;
use msgboard_core::{render, BoardState, BoardView, Identity};

/// Input mode for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Navigate the list, vote, toggle comments
    #[default]
    Normal,
    /// Typing the new message description
    Compose,
    /// Typing a path to attach to the new message
    Media,
    /// Typing a comment for the selected message
    Comment,
}

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current input mode
    pub mode: Mode,
    /// Everything the board knows
    pub board: BoardState,
    /// Used to build media URLs
    pub endpoints: Endpoints,
    /// Currently selected message index
    pub selected_index: usize,
    /// Scroll offset for list view
    pub scroll_offset: usize,
    /// Rows the list pane showed on the last frame (0 before the first draw)
    pub list_height: usize,
    /// Media path being typed (Media mode)
    pub media_input: String,
    /// Comment target, fixed when Comment mode starts
    pub comment_target: Option<MessageId>,
    /// Status message (shown in status bar)
    pub status_message: Option<String>,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl App {
    pub fn new(identity: Identity, endpoints: Endpoints) -> Self {
        Self {
            mode: Mode::Normal,
            board: BoardState::new(identity),
            endpoints,
            selected_index: 0,
            scroll_offset: 0,
            list_height: 0,
            media_input: String::new(),
            comment_target: None,
            status_message: None,
            should_quit: false,
        }
    }

    /// Project the board for drawing
    pub fn view(&self) -> BoardView {
        render(&self.board, &self.endpoints)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Id of the highlighted message
    pub fn selected_id(&self) -> Option<MessageId> {
        self.board
            .messages()
            .get(self.selected_index)
            .map(|message| message.id.clone())
    }

    pub fn select_next(&mut self) {
        let len = self.board.messages().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
            self.ensure_visible();
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.board.messages().len();
        if len > 0 {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(len.saturating_sub(1));
            self.ensure_visible();
        }
    }

    /// Keep the selection in range after the list is replaced
    pub fn clamp_selection(&mut self) {
        let len = self.board.messages().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        self.ensure_visible();
    }

    /// Record the list pane height and scroll the selection into view
    pub fn set_list_height(&mut self, height: usize) {
        self.list_height = height;
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        // Keep 2 items of context when scrolling
        const CONTEXT: usize = 2;

        let height = self.list_height;
        if height == 0 {
            return;
        }
        // Short panes cannot afford context on both sides
        let context = CONTEXT.min(height.saturating_sub(1) / 2);

        if self.selected_index < self.scroll_offset + context {
            self.scroll_offset = self.selected_index.saturating_sub(context);
        }
        if self.selected_index + context >= self.scroll_offset + height {
            self.scroll_offset = self.selected_index + context + 1 - height;
        }

        let max_offset = self.board.messages().len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn enter_compose(&mut self) {
        self.mode = Mode::Compose;
    }

    pub fn enter_media(&mut self) {
        self.media_input.clear();
        self.mode = Mode::Media;
    }

    /// Start a comment on the selected message; false if nothing is selected
    pub fn enter_comment(&mut self) -> bool {
        match self.selected_id() {
            Some(id) => {
                self.comment_target = Some(id);
                self.mode = Mode::Comment;
                true
            }
            None => false,
        }
    }

    /// Exit current mode back to normal; drafts are kept
    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.comment_target = None;
    }

    /// Text buffer the current mode edits
    fn input_mut(&mut self) -> Option<&mut String> {
        match self.mode {
            Mode::Normal => None,
            Mode::Compose => Some(&mut self.board.compose_mut().description),
            Mode::Media => Some(&mut self.media_input),
            Mode::Comment => {
                let id = self.comment_target.clone()?;
                Some(self.board.comment_draft_mut(&id))
            }
        }
    }

    pub fn input_insert(&mut self, c: char) {
        if let Some(input) = self.input_mut() {
            input.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(input) = self.input_mut() {
            input.pop();
        }
    }
}
