//! The account/chat data model (spec §3).

use std::collections::HashMap;

use crate::wire::Tag;

/// One stored text, as held inside a particular user's view of a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Sender tag, from the owning account's perspective.
    pub tag: Tag,
    /// The raw text content (possibly empty; no length cap).
    pub content: Vec<u8>,
}

/// The owner's view of a conversation with one correspondent: an ordered
/// sequence of texts.
pub type Chat = Vec<Text>;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub(crate) password: Vec<u8>,
    pub(crate) chats: HashMap<Vec<u8>, Chat>,
}

impl Account {
    pub(crate) fn new(password: Vec<u8>) -> Self {
        Self {
            password,
            chats: HashMap::new(),
        }
    }
}
