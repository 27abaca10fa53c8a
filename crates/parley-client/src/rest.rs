//! REST collaborators: user identity and room-list lookups.
//!
//! Both endpoints authenticate with the same bearer credential as the
//! realtime connection. Failures are reported to the caller, who logs them
//! and keeps prior state.

use serde::Deserialize;
use thiserror::Error;

use parley_shared::types::{ChatRoomSummary, CurrentUser};

#[derive(Error, Debug)]
pub enum RestError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// Thin client over the two REST endpoints the session depends on.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct RoomListResponse {
    list: Vec<ChatRoomSummary>,
}

impl RestClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
        }
    }

    /// `GET /user` — identity of the credential's owner.
    pub async fn fetch_current_user(&self, credential: &str) -> Result<CurrentUser, RestError> {
        let response = self
            .http
            .get(format!("{}/user", self.api_base_url))
            .bearer_auth(credential)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RestError::Status(response.status()));
        }

        Ok(response.json::<CurrentUser>().await?)
    }

    /// `GET /chat/rooms` — the full room list projection.
    pub async fn fetch_rooms(&self, credential: &str) -> Result<Vec<ChatRoomSummary>, RestError> {
        let response = self
            .http
            .get(format!("{}/chat/rooms", self.api_base_url))
            .bearer_auth(credential)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RestError::Status(response.status()));
        }

        Ok(response.json::<RoomListResponse>().await?.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_shared::types::RoomId;

    #[test]
    fn test_room_list_decode() {
        let json = r#"{
            "list": [
                { "id": "r1", "name": "general", "participantCount": 4,
                  "unreadCount": 0, "lastMessage": null, "lastActivity": null },
                { "id": "r2", "name": "random", "participantCount": 2,
                  "unreadCount": 7, "lastMessage": "lunch?", "lastActivity": "1h ago" }
            ]
        }"#;

        let parsed: RoomListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.list.len(), 2);
        assert_eq!(parsed.list[0].id, RoomId::new("r1"));
        assert_eq!(parsed.list[1].unread_count, 7);
    }

    #[test]
    fn test_current_user_decode() {
        let json = r#"{ "id": "u9", "displayName": "Ada", "avatarUrl": "https://cdn/x.png" }"#;
        let user: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_str(), "u9");
        assert_eq!(user.avatar_url.as_deref(), Some("https://cdn/x.png"));
    }
}
