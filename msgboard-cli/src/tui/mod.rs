//! Interactive board view
//!
//! - Message list with vote counts, media kind and pending-request markers
//! - Detail pane for the selected message and its comment panel
//! - Compose form for a new message with an optional attachment
//! - Normal/edit mode switching (vim-style)

pub mod app;
pub mod event;
pub mod terminal;
pub mod ui;

pub use terminal::run;
