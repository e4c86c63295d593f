//! Acting identity for board operations
//!
//! Authentication happens elsewhere; the username is passed in explicitly and
//! used verbatim on every mutating call. Nothing here validates it.

use std::fmt;

/// The user on whose behalf the board acts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
