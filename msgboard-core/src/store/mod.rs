//! Message store client
//!
//! One trait, two implementations:
//! - [`HttpMessageStore`] talks to the remote store over REST
//! - [`MemoryStore`] keeps everything in process and records calls (tests)

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, Message, MessageId, NewMessage};

pub mod http;
pub mod memory;

pub use http::{Endpoints, HttpMessageStore};
pub use memory::{MemoryStore, StoreCall};

/// The seven round trips the board can make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMessages,
    CreateMessage,
    DeleteMessage,
    Upvote,
    Downvote,
    AddComment,
    ListComments,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListMessages => "list messages",
            Operation::CreateMessage => "create message",
            Operation::DeleteMessage => "delete message",
            Operation::Upvote => "upvote",
            Operation::Downvote => "downvote",
            Operation::AddComment => "add comment",
            Operation::ListComments => "list comments",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote service of record for messages, votes and comments.
///
/// Each call is an independent round trip: no retry, no idempotency key.
/// Vote invariants are the store's business, the client sends what it is told.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    async fn list_messages(&self) -> Result<Vec<Message>>;

    async fn create_message(&self, message: NewMessage) -> Result<()>;

    async fn delete_message(&self, id: &MessageId) -> Result<()>;

    async fn upvote(&self, id: &MessageId, username: &str) -> Result<()>;

    async fn downvote(&self, id: &MessageId, username: &str) -> Result<()>;

    async fn add_comment(&self, id: &MessageId, username: &str, text: &str) -> Result<()>;

    async fn list_comments(&self, id: &MessageId) -> Result<Vec<Comment>>;
}
