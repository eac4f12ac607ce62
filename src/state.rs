use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

/// Session-scoped message identifier, rendered as `m<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_owned())
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        ConversationId(value.to_owned())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub online: bool,
}

impl User {
    /// Up to two uppercase initials, used by the avatar.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// Delivery progression of a locally sent message. Ordered, so a transition
/// is applied only when it moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Voice,
    File,
    Image,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileRef {
    pub url: String,
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Text,
    Voice { url: String, duration_secs: u32 },
    File(FileRef),
    Image(FileRef),
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Text => MessageKind::Text,
            Payload::Voice { .. } => MessageKind::Voice,
            Payload::File(_) => MessageKind::File,
            Payload::Image(_) => MessageKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub text: Option<String>,
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// Non-empty text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: [User; 2],
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: u32,
}

impl Conversation {
    /// The participant that is not `me`.
    pub fn other(&self, me: &UserId) -> Option<&User> {
        self.participants.iter().find(|user| &user.id != me)
    }
}

/// What the composer hands to the store: everything but the fields the store
/// assigns itself.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MessageDraft {
    pub text: Option<String>,
    pub payload: Payload,
}

impl MessageDraft {
    pub fn text(text: impl Into<String>) -> Self {
        MessageDraft {
            text: Some(text.into()),
            payload: Payload::Text,
        }
    }

    pub fn voice(url: impl Into<String>, duration_secs: u32) -> Self {
        MessageDraft {
            text: None,
            payload: Payload::Voice {
                url: url.into(),
                duration_secs,
            },
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether the payload carries what its type requires.
    pub fn is_sendable(&self) -> bool {
        match &self.payload {
            Payload::Text => self
                .text
                .as_deref()
                .map_or(false, |text| !text.trim().is_empty()),
            Payload::Voice { url, .. } => !url.is_empty(),
            Payload::File(file) | Payload::Image(file) => {
                !file.url.is_empty() && !file.name.is_empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            name: name.to_owned(),
            online: false,
        }
    }

    #[test]
    fn status_only_orders_forward() {
        assert!(MessageStatus::Sent < MessageStatus::Delivered);
        assert!(MessageStatus::Delivered < MessageStatus::Read);
    }

    #[test]
    fn initials() {
        assert_eq!(user("u1", "Priya Sharma").initials(), "PS");
        assert_eq!(user("u2", "cher").initials(), "C");
        assert_eq!(user("u3", "Anna Maria Lopez").initials(), "AM");
        assert_eq!(user("u4", "").initials(), "");
    }

    #[test]
    fn draft_validation() {
        assert!(MessageDraft::text("hello").is_sendable());
        assert!(!MessageDraft::text("   \n").is_sendable());
        assert!(!MessageDraft {
            text: None,
            payload: Payload::Text
        }
        .is_sendable());
        assert!(MessageDraft::voice("blob:1", 7).is_sendable());
        assert!(!MessageDraft::voice("", 7).is_sendable());

        let file = FileRef {
            url: "blob:2".to_owned(),
            name: String::new(),
            size: 10,
        };
        assert!(!MessageDraft {
            text: None,
            payload: Payload::File(file.clone())
        }
        .is_sendable());
        let file = FileRef {
            name: "notes.pdf".to_owned(),
            ..file
        };
        assert!(MessageDraft {
            text: None,
            payload: Payload::Image(file)
        }
        .is_sendable());
    }

    #[test]
    fn other_participant() {
        let conversation = Conversation {
            id: "c1".into(),
            participants: [user("me", "You"), user("u1", "Priya Sharma")],
            last_message: String::new(),
            last_message_time: Utc::now(),
            unread_count: 0,
        };
        let me = UserId::from("me");
        assert_eq!(conversation.other(&me).map(|u| u.name.as_str()), Some("Priya Sharma"));
    }

    #[test]
    fn serialized_shape() {
        let message = Message {
            id: MessageId(7),
            conversation_id: "c1".into(),
            sender_id: "me".into(),
            text: None,
            payload: Payload::Voice {
                url: "blob:1".to_owned(),
                duration_secs: 3,
            },
            timestamp: Utc::now(),
            status: MessageStatus::Delivered,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["conversation_id"], "c1");
        assert_eq!(value["status"], "delivered");
        assert_eq!(value["payload"]["type"], "voice");
        assert_eq!(MessageId(7).to_string(), "m7");
    }
}
