//! Sequential driver for the board state machine
//!
//! Runs each request against the store, feeds the completion back and keeps
//! going until the machine stops asking for follow-ups. Used by one-shot CLI
//! commands and tests; the interactive view dispatches [`execute`] on tasks
//! instead.

use std::sync::Arc;

use tracing::debug;

use crate::board::{BoardState, Completion, Request};
use crate::error::{BoardError, Result};
use crate::models::MessageId;
use crate::session::Identity;
use crate::store::{MessageStore, Operation};

/// Run one request against the store and package the outcome
pub async fn execute(store: &dyn MessageStore, request: Request) -> Completion {
    debug!(operation = %request.operation(), "executing");

    match request {
        Request::ListMessages { ticket } => Completion::MessagesLoaded {
            ticket,
            result: store.list_messages().await,
        },
        Request::CreateMessage(message) => {
            Completion::MessageCreated(store.create_message(message).await)
        }
        Request::DeleteMessage { id } => {
            let result = store.delete_message(&id).await;
            Completion::Mutated {
                id,
                operation: Operation::DeleteMessage,
                result,
            }
        }
        Request::Upvote { id, username } => {
            let result = store.upvote(&id, &username).await;
            Completion::Mutated {
                id,
                operation: Operation::Upvote,
                result,
            }
        }
        Request::Downvote { id, username } => {
            let result = store.downvote(&id, &username).await;
            Completion::Mutated {
                id,
                operation: Operation::Downvote,
                result,
            }
        }
        Request::AddComment { id, username, text } => {
            let result = store.add_comment(&id, &username, &text).await;
            Completion::CommentAdded { id, result }
        }
        Request::ListComments { id } => {
            let result = store.list_comments(&id).await;
            Completion::CommentsLoaded { id, result }
        }
    }
}

/// Board state paired with a store, driven one request at a time
pub struct BoardController {
    store: Arc<dyn MessageStore>,
    state: BoardState,
}

impl BoardController {
    pub fn new(store: Arc<dyn MessageStore>, identity: Identity) -> Self {
        Self {
            store,
            state: BoardState::new(identity),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BoardState {
        &mut self.state
    }

    /// Mount and load the initial list
    pub async fn mount(&mut self) -> Result<()> {
        let request = self.state.mount();
        self.drive(request).await
    }

    pub fn unmount(&mut self) {
        self.state.unmount();
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let request = self.state.request_refresh();
        self.drive(request).await
    }

    /// Post the compose draft; the draft is cleared only if the store accepts it
    pub async fn submit(&mut self) -> Result<()> {
        let request = self.state.begin_submit()?;
        self.drive(Some(request)).await
    }

    pub async fn upvote(&mut self, id: &MessageId) -> Result<()> {
        let request = self.state.begin_upvote(id)?;
        self.drive(Some(request)).await
    }

    pub async fn downvote(&mut self, id: &MessageId) -> Result<()> {
        let request = self.state.begin_downvote(id)?;
        self.drive(Some(request)).await
    }

    pub async fn delete(&mut self, id: &MessageId) -> Result<()> {
        let request = self.state.begin_delete(id)?;
        self.drive(Some(request)).await
    }

    /// Send the current comment draft for `id`
    pub async fn add_comment(&mut self, id: &MessageId) -> Result<()> {
        let request = self.state.begin_add_comment(id)?;
        self.drive(Some(request)).await
    }

    pub async fn toggle_comments(&mut self, id: &MessageId) -> Result<()> {
        let request = self.state.toggle_comments(id);
        self.drive(request).await
    }

    /// Run requests until the machine stops asking for follow-ups.
    ///
    /// The state absorbs every failure; the first one is also reported back
    /// so one-shot callers can exit non-zero.
    async fn drive(&mut self, mut next: Option<Request>) -> Result<()> {
        let mut first_failure = None;

        while let Some(request) = next.take() {
            let completion = execute(self.store.as_ref(), request).await;
            if first_failure.is_none() {
                if let Some(err) = completion.error() {
                    first_failure =
                        Some(BoardError::failed(completion.operation().as_str(), err.to_string()));
                }
            }
            next = self.state.complete(completion);
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
