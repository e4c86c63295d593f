//! Board view state machine
//!
//! All state lives here and changes in two steps: a `begin_*` call records
//! intent and hands back a [`Request`] to run against the store, then
//! [`BoardState::complete`] folds the matching [`Completion`] back in and may
//! hand back a follow-up list fetch. Nothing here touches the network, so the
//! same machine drives the sequential controller and the interactive view.
//!
//! Invariants:
//! - at most one list fetch in flight; mutations landing meanwhile mark the
//!   board dirty and get one coalesced fetch afterwards
//! - a list response older than the last applied one is dropped
//! - at most one vote/comment/delete in flight per message
//! - at most one comment fetch per message (the panel sits in `Loading`)
//! - completions after unmount are ignored

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::error::{BoardError, Result};
use crate::models::{Comment, MediaAttachment, Message, MessageId, NewMessage};
use crate::session::Identity;
use crate::store::Operation;

// ============================================================================
// State pieces
// ============================================================================

/// Visibility of one message's comments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommentPanel {
    #[default]
    Collapsed,
    Loading,
    Expanded(Vec<Comment>),
}

/// Compose form lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposePhase {
    #[default]
    Idle,
    Submitting,
}

/// Not-yet-submitted message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeDraft {
    pub description: String,
    pub media: Option<MediaAttachment>,
}

impl ComposeDraft {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.media.is_none()
    }
}

#[derive(Debug, Default)]
struct RefreshTracker {
    last_issued: u64,
    last_applied: u64,
    pending: Option<u64>,
    dirty: bool,
}

// ============================================================================
// Requests and completions
// ============================================================================

/// A store call the board wants made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListMessages { ticket: u64 },
    CreateMessage(NewMessage),
    DeleteMessage { id: MessageId },
    Upvote { id: MessageId, username: String },
    Downvote { id: MessageId, username: String },
    AddComment { id: MessageId, username: String, text: String },
    ListComments { id: MessageId },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::ListMessages { .. } => Operation::ListMessages,
            Request::CreateMessage(_) => Operation::CreateMessage,
            Request::DeleteMessage { .. } => Operation::DeleteMessage,
            Request::Upvote { .. } => Operation::Upvote,
            Request::Downvote { .. } => Operation::Downvote,
            Request::AddComment { .. } => Operation::AddComment,
            Request::ListComments { .. } => Operation::ListComments,
        }
    }
}

/// Outcome of a [`Request`]
#[derive(Debug)]
pub enum Completion {
    MessagesLoaded {
        ticket: u64,
        result: Result<Vec<Message>>,
    },
    MessageCreated(Result<()>),
    /// Delete, upvote or downvote
    Mutated {
        id: MessageId,
        operation: Operation,
        result: Result<()>,
    },
    CommentAdded {
        id: MessageId,
        result: Result<()>,
    },
    CommentsLoaded {
        id: MessageId,
        result: Result<Vec<Comment>>,
    },
}

impl Completion {
    pub fn operation(&self) -> Operation {
        match self {
            Completion::MessagesLoaded { .. } => Operation::ListMessages,
            Completion::MessageCreated(_) => Operation::CreateMessage,
            Completion::Mutated { operation, .. } => *operation,
            Completion::CommentAdded { .. } => Operation::AddComment,
            Completion::CommentsLoaded { .. } => Operation::ListComments,
        }
    }

    /// The store error carried by this outcome, if any
    pub fn error(&self) -> Option<&BoardError> {
        match self {
            Completion::MessagesLoaded { result, .. } => result.as_ref().err(),
            Completion::MessageCreated(result)
            | Completion::Mutated { result, .. }
            | Completion::CommentAdded { result, .. } => result.as_ref().err(),
            Completion::CommentsLoaded { result, .. } => result.as_ref().err(),
        }
    }
}

// ============================================================================
// Board state
// ============================================================================

/// In-memory state of one mounted board view
#[derive(Debug)]
pub struct BoardState {
    identity: Identity,
    mounted: bool,
    messages: Vec<Message>,
    compose: ComposeDraft,
    compose_phase: ComposePhase,
    comment_drafts: HashMap<MessageId, String>,
    panels: HashMap<MessageId, CommentPanel>,
    in_flight: HashSet<MessageId>,
    refresh: RefreshTracker,
}

impl BoardState {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            mounted: false,
            messages: Vec::new(),
            compose: ComposeDraft::default(),
            compose_phase: ComposePhase::Idle,
            comment_drafts: HashMap::new(),
            panels: HashMap::new(),
            in_flight: HashSet::new(),
            refresh: RefreshTracker::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn compose(&self) -> &ComposeDraft {
        &self.compose
    }

    pub fn compose_mut(&mut self) -> &mut ComposeDraft {
        &mut self.compose
    }

    pub fn is_submitting(&self) -> bool {
        self.compose_phase == ComposePhase::Submitting
    }

    pub fn comment_draft(&self, id: &MessageId) -> &str {
        self.comment_drafts.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn comment_draft_mut(&mut self, id: &MessageId) -> &mut String {
        self.comment_drafts.entry(id.clone()).or_default()
    }

    pub fn set_comment_draft(&mut self, id: &MessageId, text: impl Into<String>) {
        self.comment_drafts.insert(id.clone(), text.into());
    }

    pub fn panel(&self, id: &MessageId) -> &CommentPanel {
        static COLLAPSED: CommentPanel = CommentPanel::Collapsed;
        self.panels.get(id).unwrap_or(&COLLAPSED)
    }

    pub fn is_in_flight(&self, id: &MessageId) -> bool {
        self.in_flight.contains(id)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.pending.is_some()
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Mount the view; returns the initial list fetch
    pub fn mount(&mut self) -> Option<Request> {
        self.mounted = true;
        self.request_refresh()
    }

    /// Discard everything; later completions become no-ops
    pub fn unmount(&mut self) {
        let identity = self.identity.clone();
        let issued = self.refresh.last_issued;
        *self = Self::new(identity);

        // Tickets handed out before this point must never match or apply again
        self.refresh.last_issued = issued;
        self.refresh.last_applied = issued;
    }

    /// Ask for a list fetch, coalescing with one already in flight
    pub fn request_refresh(&mut self) -> Option<Request> {
        if !self.mounted {
            return None;
        }

        if self.refresh.pending.is_some() {
            self.refresh.dirty = true;
            debug!("list fetch in flight, marking board dirty");
            return None;
        }

        self.refresh.last_issued += 1;
        let ticket = self.refresh.last_issued;
        self.refresh.pending = Some(ticket);
        self.refresh.dirty = false;
        Some(Request::ListMessages { ticket })
    }

    // ------------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------------

    /// Submit the compose draft; the draft stays until the store accepts it
    pub fn begin_submit(&mut self) -> Result<Request> {
        if self.is_submitting() {
            warn!("submit ignored, a message is already being submitted");
            return Err(BoardError::SubmitInProgress);
        }

        self.compose_phase = ComposePhase::Submitting;
        Ok(Request::CreateMessage(NewMessage {
            author: self.identity.username().to_string(),
            description: self.compose.description.clone(),
            media: self.compose.media.clone(),
        }))
    }

    pub fn begin_upvote(&mut self, id: &MessageId) -> Result<Request> {
        self.claim(id)?;
        Ok(Request::Upvote {
            id: id.clone(),
            username: self.identity.username().to_string(),
        })
    }

    pub fn begin_downvote(&mut self, id: &MessageId) -> Result<Request> {
        self.claim(id)?;
        Ok(Request::Downvote {
            id: id.clone(),
            username: self.identity.username().to_string(),
        })
    }

    pub fn begin_delete(&mut self, id: &MessageId) -> Result<Request> {
        self.claim(id)?;
        Ok(Request::DeleteMessage { id: id.clone() })
    }

    /// Send the comment draft for a message as-is
    pub fn begin_add_comment(&mut self, id: &MessageId) -> Result<Request> {
        self.claim(id)?;
        Ok(Request::AddComment {
            id: id.clone(),
            username: self.identity.username().to_string(),
            text: self.comment_draft(id).to_string(),
        })
    }

    /// Flip a comment panel; returns a fetch when expanding needs one
    pub fn toggle_comments(&mut self, id: &MessageId) -> Option<Request> {
        match self.panels.get(id) {
            Some(CommentPanel::Loading) => {
                debug!(%id, "comments already loading");
                None
            }
            Some(CommentPanel::Expanded(comments)) if !comments.is_empty() => {
                // Collapsing drops the cache, next expand fetches again
                self.panels.insert(id.clone(), CommentPanel::Collapsed);
                None
            }
            _ => {
                self.panels.insert(id.clone(), CommentPanel::Loading);
                Some(Request::ListComments { id: id.clone() })
            }
        }
    }

    fn claim(&mut self, id: &MessageId) -> Result<()> {
        if !self.in_flight.insert(id.clone()) {
            warn!(%id, "request ignored, message already has one in flight");
            return Err(BoardError::busy(id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------------

    /// Fold a store outcome into the state; failures are logged and dropped
    pub fn complete(&mut self, completion: Completion) -> Option<Request> {
        if !self.mounted {
            debug!("board unmounted, dropping completion");
            return None;
        }

        match completion {
            Completion::MessagesLoaded { ticket, result } => self.messages_loaded(ticket, result),
            Completion::MessageCreated(result) => {
                self.compose_phase = ComposePhase::Idle;
                match result {
                    Ok(()) => {
                        info!("message posted");
                        self.compose = ComposeDraft::default();
                        self.request_refresh()
                    }
                    Err(err) => {
                        warn!(error = %err, "Error posting message");
                        None
                    }
                }
            }
            Completion::Mutated {
                id,
                operation,
                result,
            } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(()) => {
                        info!(%id, %operation, "store accepted");
                        self.request_refresh()
                    }
                    Err(err) => {
                        warn!(%id, %operation, error = %err, "store rejected");
                        None
                    }
                }
            }
            Completion::CommentAdded { id, result } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(()) => {
                        info!(%id, "comment added");
                        let refresh = self.request_refresh();
                        self.comment_drafts.insert(id, String::new());
                        refresh
                    }
                    Err(err) => {
                        warn!(%id, error = %err, "Error adding comment");
                        None
                    }
                }
            }
            Completion::CommentsLoaded { id, result } => {
                if self.panels.get(&id) != Some(&CommentPanel::Loading) {
                    debug!(%id, "comment panel no longer loading, dropping result");
                    return None;
                }
                match result {
                    Ok(comments) => {
                        self.panels.insert(id, CommentPanel::Expanded(comments));
                    }
                    Err(err) => {
                        warn!(%id, error = %err, "Error fetching comments");
                        self.panels.insert(id, CommentPanel::Collapsed);
                    }
                }
                None
            }
        }
    }

    fn messages_loaded(&mut self, ticket: u64, result: Result<Vec<Message>>) -> Option<Request> {
        if self.refresh.pending == Some(ticket) {
            self.refresh.pending = None;
        }

        match result {
            Ok(messages) if ticket > self.refresh.last_applied => {
                debug!(ticket, count = messages.len(), "applying message list");
                self.refresh.last_applied = ticket;
                self.messages = messages;
            }
            Ok(_) => {
                debug!(ticket, applied = self.refresh.last_applied, "dropping stale message list");
            }
            Err(err) => {
                warn!(error = %err, "Error fetching messages");
            }
        }

        if self.refresh.dirty && self.refresh.pending.is_none() {
            self.request_refresh()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardState {
        BoardState::new(Identity::new("alice"))
    }

    fn message(id: &str) -> Message {
        Message {
            id: id.into(),
            author: "bob".to_string(),
            description: format!("message {}", id),
            media: None,
            upvoters: Default::default(),
            downvoters: Default::default(),
            comments: Vec::new(),
        }
    }

    fn comment(text: &str) -> Comment {
        Comment {
            author: "bob".to_string(),
            text: text.to_string(),
        }
    }

    fn loaded(ticket: u64, messages: Vec<Message>) -> Completion {
        Completion::MessagesLoaded {
            ticket,
            result: Ok(messages),
        }
    }

    fn failure() -> BoardError {
        BoardError::status("test", 500, "boom")
    }

    /// Mount and apply an initial list
    fn mounted_with(messages: Vec<Message>) -> BoardState {
        let mut board = board();
        let Some(Request::ListMessages { ticket }) = board.mount() else {
            panic!("mount must fetch");
        };
        assert!(board.complete(loaded(ticket, messages)).is_none());
        board
    }

    #[test]
    fn mount_issues_one_fetch() {
        let mut board = board();
        assert_eq!(board.mount(), Some(Request::ListMessages { ticket: 1 }));
        assert!(board.is_refreshing());
    }

    #[test]
    fn not_mounted_means_no_fetch_and_ignored_completions() {
        let mut board = board();
        assert!(board.request_refresh().is_none());
        assert!(board.complete(loaded(1, vec![message("a")])).is_none());
        assert!(board.messages().is_empty());
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let mut board = mounted_with(vec![message("a")]);
        let Some(Request::ListMessages { ticket }) = board.request_refresh() else {
            panic!("expected fetch");
        };

        board.complete(Completion::MessagesLoaded {
            ticket,
            result: Err(failure()),
        });

        assert_eq!(board.messages().len(), 1);
        assert!(!board.is_refreshing());
    }

    #[test]
    fn mutations_during_fetch_coalesce_into_one_follow_up() {
        let mut board = mounted_with(vec![message("a"), message("b")]);
        let first = board.request_refresh();
        assert_eq!(first, Some(Request::ListMessages { ticket: 2 }));

        for id in ["a", "b"] {
            let id = MessageId::from(id);
            board.begin_upvote(&id).unwrap();
            let follow_up = board.complete(Completion::Mutated {
                id,
                operation: Operation::Upvote,
                result: Ok(()),
            });
            assert!(follow_up.is_none(), "fetch already in flight");
        }

        let follow_up = board.complete(loaded(2, vec![message("a")]));
        assert_eq!(follow_up, Some(Request::ListMessages { ticket: 3 }));

        assert!(board.complete(loaded(3, vec![message("a")])).is_none());
        assert!(!board.is_refreshing());
    }

    #[test]
    fn stale_list_is_dropped() {
        let mut board = mounted_with(vec![message("new")]);
        board.complete(loaded(1, vec![message("old")]));
        assert_eq!(board.messages()[0].id, MessageId::from("new"));
    }

    #[test]
    fn second_mutation_for_same_message_is_busy() {
        let mut board = mounted_with(vec![message("a")]);
        let id = MessageId::from("a");

        board.begin_upvote(&id).unwrap();
        assert!(matches!(board.begin_downvote(&id), Err(BoardError::Busy { .. })));
        assert!(matches!(board.begin_add_comment(&id), Err(BoardError::Busy { .. })));
        assert!(board.is_in_flight(&id));

        board.complete(Completion::Mutated {
            id: id.clone(),
            operation: Operation::Upvote,
            result: Err(failure()),
        });
        assert!(!board.is_in_flight(&id));
        assert!(board.begin_downvote(&id).is_ok());
    }

    #[test]
    fn other_messages_are_not_blocked() {
        let mut board = mounted_with(vec![message("a"), message("b")]);
        board.begin_upvote(&"a".into()).unwrap();
        assert!(board.begin_upvote(&"b".into()).is_ok());
    }

    #[test]
    fn vote_requests_carry_identity() {
        let mut board = mounted_with(vec![message("a")]);
        assert_eq!(
            board.begin_downvote(&"a".into()).unwrap(),
            Request::Downvote {
                id: "a".into(),
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn failed_mutation_does_not_refresh() {
        let mut board = mounted_with(vec![message("a")]);
        board.begin_delete(&"a".into()).unwrap();
        let follow_up = board.complete(Completion::Mutated {
            id: "a".into(),
            operation: Operation::DeleteMessage,
            result: Err(failure()),
        });
        assert!(follow_up.is_none());
        assert_eq!(board.messages().len(), 1);
    }

    #[test]
    fn submit_keeps_draft_until_success() {
        let mut board = mounted_with(vec![]);
        board.compose_mut().description = "hi".to_string();

        let request = board.begin_submit().unwrap();
        assert_eq!(
            request,
            Request::CreateMessage(NewMessage {
                author: "alice".to_string(),
                description: "hi".to_string(),
                media: None,
            })
        );
        assert!(board.is_submitting());
        assert_eq!(board.compose().description, "hi");
        assert!(matches!(board.begin_submit(), Err(BoardError::SubmitInProgress)));

        let follow_up = board.complete(Completion::MessageCreated(Ok(())));
        assert!(matches!(follow_up, Some(Request::ListMessages { .. })));
        assert!(board.compose().is_empty());
        assert!(!board.is_submitting());
    }

    #[test]
    fn failed_submit_keeps_draft() {
        let mut board = mounted_with(vec![message("a")]);
        board.compose_mut().description = "hi".to_string();
        board.compose_mut().media = Some(MediaAttachment::new("clip.mp4", vec![1, 2]));

        board.begin_submit().unwrap();
        let follow_up = board.complete(Completion::MessageCreated(Err(failure())));

        assert!(follow_up.is_none());
        assert_eq!(board.compose().description, "hi");
        assert!(board.compose().media.is_some());
        assert!(!board.is_submitting());
        assert_eq!(board.messages().len(), 1);
    }

    #[test]
    fn comment_sends_draft_and_clears_on_success() {
        let mut board = mounted_with(vec![message("x")]);
        let id = MessageId::from("x");
        board.set_comment_draft(&id, "hello");

        assert_eq!(
            board.begin_add_comment(&id).unwrap(),
            Request::AddComment {
                id: id.clone(),
                username: "alice".to_string(),
                text: "hello".to_string(),
            }
        );

        let follow_up = board.complete(Completion::CommentAdded {
            id: id.clone(),
            result: Ok(()),
        });
        assert!(matches!(follow_up, Some(Request::ListMessages { .. })));
        assert_eq!(board.comment_draft(&id), "");
    }

    #[test]
    fn failed_comment_keeps_draft() {
        let mut board = mounted_with(vec![message("x")]);
        let id = MessageId::from("x");
        board.set_comment_draft(&id, "hello");
        board.begin_add_comment(&id).unwrap();

        board.complete(Completion::CommentAdded {
            id: id.clone(),
            result: Err(failure()),
        });
        assert_eq!(board.comment_draft(&id), "hello");
    }

    #[test]
    fn comment_panel_cycle() {
        let mut board = mounted_with(vec![message("x")]);
        let id = MessageId::from("x");

        // Collapsed -> Loading
        assert_eq!(
            board.toggle_comments(&id),
            Some(Request::ListComments { id: id.clone() })
        );
        assert_eq!(board.panel(&id), &CommentPanel::Loading);

        // Toggling while loading never double-fires
        assert!(board.toggle_comments(&id).is_none());

        board.complete(Completion::CommentsLoaded {
            id: id.clone(),
            result: Ok(vec![comment("first")]),
        });
        assert_eq!(board.panel(&id), &CommentPanel::Expanded(vec![comment("first")]));

        // Expanded with cache -> Collapsed, no fetch
        assert!(board.toggle_comments(&id).is_none());
        assert_eq!(board.panel(&id), &CommentPanel::Collapsed);

        // Cache was cleared, so expanding fetches again
        assert!(board.toggle_comments(&id).is_some());
    }

    #[test]
    fn empty_comment_list_refetches_on_toggle() {
        let mut board = mounted_with(vec![message("x")]);
        let id = MessageId::from("x");

        board.toggle_comments(&id);
        board.complete(Completion::CommentsLoaded {
            id: id.clone(),
            result: Ok(vec![]),
        });
        assert_eq!(board.panel(&id), &CommentPanel::Expanded(vec![]));
        assert!(board.toggle_comments(&id).is_some());
    }

    #[test]
    fn failed_comment_fetch_collapses() {
        let mut board = mounted_with(vec![message("x")]);
        let id = MessageId::from("x");

        board.toggle_comments(&id);
        board.complete(Completion::CommentsLoaded {
            id: id.clone(),
            result: Err(failure()),
        });
        assert_eq!(board.panel(&id), &CommentPanel::Collapsed);
    }

    #[test]
    fn unmount_discards_state_and_late_completions() {
        let mut board = mounted_with(vec![message("x")]);
        board.compose_mut().description = "draft".to_string();
        let Some(Request::ListMessages { ticket }) = board.request_refresh() else {
            panic!("expected fetch");
        };

        board.unmount();
        assert!(board.complete(loaded(ticket, vec![message("late")])).is_none());
        assert!(board.messages().is_empty());
        assert!(board.compose().is_empty());
        assert!(!board.is_mounted());
    }

    #[test]
    fn remount_ignores_list_from_before_unmount() {
        let mut board = mounted_with(vec![message("x")]);
        let Some(Request::ListMessages { ticket: old }) = board.request_refresh() else {
            panic!("expected fetch");
        };

        board.unmount();
        let Some(Request::ListMessages { ticket: fresh }) = board.mount() else {
            panic!("mount must fetch");
        };
        assert_ne!(old, fresh);

        assert!(board.complete(loaded(old, vec![message("late")])).is_none());
        assert!(board.messages().is_empty());
        assert!(board.is_refreshing());

        board.complete(loaded(fresh, vec![message("y")]));
        assert_eq!(board.messages().len(), 1);
        assert_eq!(board.messages()[0].id, MessageId::from("y"));
        assert!(!board.is_refreshing());
    }
}
