//! Message board data models
//!
//! Wire names follow the message store's JSON (`_id`, `username`,
//! `upvotes`, `downvotes`); Rust names follow what the fields mean.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

/// Suffix that selects video playback instead of an image
pub const VIDEO_SUFFIX: &str = ".mp4";

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque, server-assigned message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Messages and comments
// ============================================================================

/// A message as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: MessageId,
    #[serde(rename = "username")]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Stored file name of the uploaded attachment
    #[serde(default)]
    pub media: Option<String>,
    #[serde(rename = "upvotes", default)]
    pub upvoters: BTreeSet<String>,
    #[serde(rename = "downvotes", default)]
    pub downvoters: BTreeSet<String>,
    /// Not relied on by the board; comments are fetched per message
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Message {
    pub fn has_upvoted(&self, username: &str) -> bool {
        self.upvoters.contains(username)
    }

    pub fn has_downvoted(&self, username: &str) -> bool {
        self.downvoters.contains(username)
    }

    /// Media file name, treating an empty string as absent
    pub fn media_name(&self) -> Option<&str> {
        self.media.as_deref().filter(|name| !name.is_empty())
    }
}

/// A comment attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "username")]
    pub author: String,
    pub text: String,
}

// ============================================================================
// Media
// ============================================================================

/// How an attachment is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Dispatch on file name suffix only, no MIME inspection
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(VIDEO_SUFFIX) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// A local file to upload with a new message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an attachment from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| BoardError::media(path, err))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self { file_name, bytes })
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_file_name(&self.file_name)
    }
}

/// Payload for creating a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub author: String,
    pub description: String,
    pub media: Option<MediaAttachment>,
}
