use serde::{Deserialize, Serialize};

/// A single entry in the conversation log.
///
/// Messages are immutable once appended: the log only ever grows, and no
/// edit or delete operation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub is_mine: bool,
}

impl Message {
    pub fn new(text: impl Into<String>, is_mine: bool) -> Self {
        Self {
            text: text.into(),
            is_mine,
        }
    }

    /// A message typed by the local user.
    pub fn mine(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// A message produced by the remote model.
    pub fn theirs(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }
}
