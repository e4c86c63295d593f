//! Command implementations for msgboard CLI

pub mod board;

// Re-export dispatcher functions for flat access from main.rs
pub use board::{
    run_comment, run_comments, run_delete, run_downvote, run_list, run_post, run_tui, run_upvote,
};
