//! Pure projection from board state to a view tree
//!
//! No state lives here. Front ends (plain text, terminal UI, JSON) draw the
//! [`BoardView`] however they like.

use serde::Serialize;

use crate::board::{BoardState, CommentPanel};
use crate::models::{MediaKind, Message, MessageId};
use crate::store::Endpoints;

const UPVOTED: &str = "▲";
const NOT_UPVOTED: &str = "△";
const DOWNVOTED: &str = "▼";
const NOT_DOWNVOTED: &str = "▽";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub username: String,
    pub refreshing: bool,
    pub compose: ComposeView,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeView {
    pub description: String,
    pub media: Option<String>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: MessageId,
    pub author: String,
    pub description: String,
    pub media: Option<MediaView>,
    pub has_upvoted: bool,
    pub has_downvoted: bool,
    pub upvotes: usize,
    pub downvotes: usize,
    pub comment_draft: String,
    pub comments: PanelView,
    /// A vote, comment or delete is pending for this message
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaView {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "comments", rename_all = "lowercase")]
pub enum PanelView {
    Collapsed,
    Loading,
    Expanded(Vec<CommentView>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub author: String,
    pub text: String,
}

impl MessageView {
    /// Filled when the viewer upvoted; never disables the downvote
    pub fn upvote_icon(&self) -> &'static str {
        if self.has_upvoted {
            UPVOTED
        } else {
            NOT_UPVOTED
        }
    }

    pub fn downvote_icon(&self) -> &'static str {
        if self.has_downvoted {
            DOWNVOTED
        } else {
            NOT_DOWNVOTED
        }
    }
}

/// Media reference for a message, if it has one
pub fn media_view(message: &Message, endpoints: &Endpoints) -> Option<MediaView> {
    message.media_name().map(|name| MediaView {
        kind: MediaKind::from_file_name(name),
        url: endpoints.media(name),
    })
}

/// Project the whole board
pub fn render(state: &BoardState, endpoints: &Endpoints) -> BoardView {
    let username = state.identity().username();

    let messages = state
        .messages()
        .iter()
        .map(|message| MessageView {
            id: message.id.clone(),
            author: message.author.clone(),
            description: message.description.clone(),
            media: media_view(message, endpoints),
            has_upvoted: message.has_upvoted(username),
            has_downvoted: message.has_downvoted(username),
            upvotes: message.upvoters.len(),
            downvotes: message.downvoters.len(),
            comment_draft: state.comment_draft(&message.id).to_string(),
            comments: panel_view(state.panel(&message.id)),
            busy: state.is_in_flight(&message.id),
        })
        .collect();

    let compose = state.compose();

    BoardView {
        username: username.to_string(),
        refreshing: state.is_refreshing(),
        compose: ComposeView {
            description: compose.description.clone(),
            media: compose.media.as_ref().map(|media| media.file_name.clone()),
            submitting: state.is_submitting(),
        },
        messages,
    }
}

fn panel_view(panel: &CommentPanel) -> PanelView {
    match panel {
        CommentPanel::Collapsed => PanelView::Collapsed,
        CommentPanel::Loading => PanelView::Loading,
        CommentPanel::Expanded(comments) => PanelView::Expanded(
            comments
                .iter()
                .map(|comment| CommentView {
                    author: comment.author.clone(),
                    text: comment.text.clone(),
                })
                .collect(),
        ),
    }
}

/// Tree-style plain text rendering
pub fn render_text(view: &BoardView) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "┌─ Message Board :: {} messages (as {})\n",
        view.messages.len(),
        view.username
    ));

    if !view.compose.description.is_empty() || view.compose.media.is_some() {
        let status = if view.compose.submitting { " [posting]" } else { "" };
        out.push_str(&format!("│  draft: {}{}\n", view.compose.description, status));
        if let Some(ref media) = view.compose.media {
            out.push_str(&format!("│  draft media: {}\n", media));
        }
    }
    out.push_str("│\n");

    if view.messages.is_empty() {
        out.push_str("└─ (no messages)\n");
        return out;
    }

    for (i, message) in view.messages.iter().enumerate() {
        let is_last = i == view.messages.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let cont = if is_last { "   " } else { "│  " };

        out.push_str(&format!("{} {}: {}\n", prefix, message.author, message.description));
        out.push_str(&format!("{}id: {}\n", cont, message.id));

        if let Some(ref media) = message.media {
            out.push_str(&format!("{}[{}] {}\n", cont, media.kind, media.url));
        }

        out.push_str(&format!(
            "{}{} {}  {} {}\n",
            cont,
            message.upvote_icon(),
            message.upvotes,
            message.downvote_icon(),
            message.downvotes
        ));

        match &message.comments {
            PanelView::Collapsed => {}
            PanelView::Loading => out.push_str(&format!("{}comments: loading...\n", cont)),
            PanelView::Expanded(comments) if comments.is_empty() => {
                out.push_str(&format!("{}comments: (none)\n", cont));
            }
            PanelView::Expanded(comments) => {
                out.push_str(&format!("{}comments:\n", cont));
                for comment in comments {
                    out.push_str(&format!("{}  {}: {}\n", cont, comment.author, comment.text));
                }
            }
        }

        if !is_last {
            out.push_str("│\n");
        }
    }

    out
}
