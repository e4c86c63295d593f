//! In-process message store
//!
//! Behaves like the remote store (ids, votes, comments) and records every
//! call so board behavior can be asserted without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{MessageStore, Operation};
use crate::error::{BoardError, Result};
use crate::models::{Comment, Message, MessageId, NewMessage};

/// A call as the store received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListMessages,
    CreateMessage {
        author: String,
        description: String,
        media: Option<String>,
    },
    DeleteMessage {
        id: MessageId,
    },
    Upvote {
        id: MessageId,
        username: String,
    },
    Downvote {
        id: MessageId,
        username: String,
    },
    AddComment {
        id: MessageId,
        username: String,
        text: String,
    },
    ListComments {
        id: MessageId,
    },
}

impl StoreCall {
    pub fn operation(&self) -> Operation {
        match self {
            StoreCall::ListMessages => Operation::ListMessages,
            StoreCall::CreateMessage { .. } => Operation::CreateMessage,
            StoreCall::DeleteMessage { .. } => Operation::DeleteMessage,
            StoreCall::Upvote { .. } => Operation::Upvote,
            StoreCall::Downvote { .. } => Operation::Downvote,
            StoreCall::AddComment { .. } => Operation::AddComment,
            StoreCall::ListComments { .. } => Operation::ListComments,
        }
    }
}

#[derive(Default)]
struct Inner {
    messages: Vec<Message>,
    comments: HashMap<MessageId, Vec<Comment>>,
    calls: Vec<StoreCall>,
    failures: HashMap<Operation, VecDeque<u16>>,
    next_id: u64,
}

/// In-memory store with call recording and failure injection
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a message directly, bypassing call recording
    pub fn seed(&self, message: Message) {
        let mut inner = self.lock();
        inner.comments.entry(message.id.clone()).or_default();
        inner.messages.push(message);
    }

    /// Seed a comment directly, bypassing call recording
    pub fn seed_comment(&self, id: &MessageId, comment: Comment) {
        self.lock()
            .comments
            .entry(id.clone())
            .or_default()
            .push(comment);
    }

    /// Make the next call of `operation` fail with `status`
    pub fn fail_next(&self, operation: Operation, status: u16) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(status);
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received for one operation
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, then apply any injected failure
    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, Inner>> {
        let operation = call.operation();
        let mut inner = self.lock();
        inner.calls.push(call);

        let injected = inner
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match injected {
            Some(status) => Err(BoardError::status(
                operation.as_str(),
                status,
                "injected failure",
            )),
            None => Ok(inner),
        }
    }
}

fn find_mut<'a>(
    inner: &'a mut Inner,
    operation: Operation,
    id: &MessageId,
) -> Result<&'a mut Message> {
    inner
        .messages
        .iter_mut()
        .find(|message| &message.id == id)
        .ok_or_else(|| BoardError::status(operation.as_str(), 404, "Message not found"))
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_messages(&self) -> Result<Vec<Message>> {
        let inner = self.begin(StoreCall::ListMessages)?;
        Ok(inner.messages.clone())
    }

    async fn create_message(&self, message: NewMessage) -> Result<()> {
        let media = message.media.map(|media| media.file_name);
        let mut inner = self.begin(StoreCall::CreateMessage {
            author: message.author.clone(),
            description: message.description.clone(),
            media: media.clone(),
        })?;

        inner.next_id += 1;
        let id = MessageId::new(format!("m{}", inner.next_id));
        inner.comments.insert(id.clone(), Vec::new());
        inner.messages.push(Message {
            id,
            author: message.author,
            description: message.description,
            media,
            upvoters: Default::default(),
            downvoters: Default::default(),
            comments: Vec::new(),
        });
        Ok(())
    }

    async fn delete_message(&self, id: &MessageId) -> Result<()> {
        let operation = Operation::DeleteMessage;
        let mut inner = self.begin(StoreCall::DeleteMessage { id: id.clone() })?;

        let before = inner.messages.len();
        inner.messages.retain(|message| &message.id != id);
        if inner.messages.len() == before {
            return Err(BoardError::status(operation.as_str(), 404, "Message not found"));
        }
        inner.comments.remove(id);
        Ok(())
    }

    async fn upvote(&self, id: &MessageId, username: &str) -> Result<()> {
        let mut inner = self.begin(StoreCall::Upvote {
            id: id.clone(),
            username: username.to_string(),
        })?;

        // Store-side policy: a vote moves the user out of the opposite set
        let message = find_mut(&mut inner, Operation::Upvote, id)?;
        message.downvoters.remove(username);
        message.upvoters.insert(username.to_string());
        Ok(())
    }

    async fn downvote(&self, id: &MessageId, username: &str) -> Result<()> {
        let mut inner = self.begin(StoreCall::Downvote {
            id: id.clone(),
            username: username.to_string(),
        })?;

        let message = find_mut(&mut inner, Operation::Downvote, id)?;
        message.upvoters.remove(username);
        message.downvoters.insert(username.to_string());
        Ok(())
    }

    async fn add_comment(&self, id: &MessageId, username: &str, text: &str) -> Result<()> {
        let mut inner = self.begin(StoreCall::AddComment {
            id: id.clone(),
            username: username.to_string(),
            text: text.to_string(),
        })?;

        let comment = Comment {
            author: username.to_string(),
            text: text.to_string(),
        };
        find_mut(&mut inner, Operation::AddComment, id)?
            .comments
            .push(comment.clone());
        inner.comments.entry(id.clone()).or_default().push(comment);
        Ok(())
    }

    async fn list_comments(&self, id: &MessageId) -> Result<Vec<Comment>> {
        let inner = self.begin(StoreCall::ListComments { id: id.clone() })?;

        inner
            .comments
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::status(Operation::ListComments.as_str(), 404, "Message not found"))
    }
}
