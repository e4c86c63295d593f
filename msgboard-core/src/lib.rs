pub mod board;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod store;

pub use board::{BoardState, CommentPanel, ComposeDraft, Completion, Request};
pub use config::BoardConfig;
pub use controller::{execute, BoardController};
pub use error::{BoardError, Result};
pub use models::{Comment, MediaAttachment, MediaKind, Message, MessageId, NewMessage};
pub use render::{render, render_text, BoardView};
pub use session::Identity;
pub use store::{HttpMessageStore, MemoryStore, MessageStore, Operation};
