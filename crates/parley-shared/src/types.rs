use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Room identity = opaque server-assigned string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message, as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Descriptor for a file attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Download URL assigned by the server once stored (absent on locally
    /// originated messages that have not been echoed back yet).
    pub url: Option<String>,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
    System,
}

/// A single entry in the room-scoped message log.
///
/// Tagged union over text / file / system. `sender` is absent on system
/// messages, `content` on file messages, `file` on everything but files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub sender: Option<Sender>,
    pub content: Option<String>,
    pub file: Option<FileInfo>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn text(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            sender: Some(sender),
            content: Some(content.into()),
            file: None,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::System,
            sender: None,
            content: Some(content.into()),
            file: None,
            timestamp: Utc::now(),
        }
    }
}

/// Read-only projection of a room for the room list.
///
/// Fetched on demand and replaced wholesale; never kept in sync incrementally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomSummary {
    pub id: RoomId,
    pub name: String,
    pub participant_count: u32,
    pub unread_count: u32,
    pub last_message: Option<String>,
    /// Relative time label rendered by the server ("2m ago").
    pub last_activity: Option<String>,
}

/// Identity of the authenticated user, fetched once per credential.
///
/// Used only to classify messages as own vs. others' by sender id equality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serde_shape() {
        let msg = Message::text(
            Sender {
                id: UserId("u1".into()),
                display_name: "Ada".into(),
                avatar_url: None,
            },
            "hello",
        );

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["sender"]["displayName"], "Ada");
        assert_eq!(json["content"], "hello");
        assert!(json["file"].is_null());
    }

    #[test]
    fn test_room_summary_decode() {
        let json = r#"{
            "id": "r1",
            "name": "general",
            "participantCount": 12,
            "unreadCount": 3,
            "lastMessage": "see you there",
            "lastActivity": "5m ago"
        }"#;

        let summary: ChatRoomSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.id, RoomId::new("r1"));
        assert_eq!(summary.participant_count, 12);
        assert_eq!(summary.last_message.as_deref(), Some("see you there"));
    }
}
