//! Session state mutated by the single event-processing task.
//!
//! All fields are owned by [`crate::session::Session`] and only ever touched
//! from its command methods and event applier, so no locking is involved.

use std::path::PathBuf;

use parley_shared::types::{ChatRoomSummary, CurrentUser, Message, RoomId};

/// Transport connection state as observed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
}

/// Central session state.
#[derive(Debug)]
pub struct SessionState {
    /// Bearer token gating connection attempts. Empty means signed out.
    pub credential: String,

    /// Transport state; `Connected` is the sole gate for room and
    /// message operations.
    pub conn: ConnState,

    /// The single currently joined room, if any.
    pub current_room: Option<RoomId>,

    /// Ordered, room-scoped message log. Always empty immediately after a
    /// join or leave transition.
    pub messages: Vec<Message>,

    /// Room list projection, replaced wholesale on each fetch.
    pub room_summaries: Vec<ChatRoomSummary>,

    /// Identity fetched once per credential; used to classify messages as
    /// own vs. others'.
    pub current_user: Option<CurrentUser>,

    /// At most one local file awaiting send.
    pub pending_file: Option<PathBuf>,

    /// Local input buffer, cleared optimistically on send.
    pub draft: String,

    /// Generation counter for credential-scoped async completions.
    pub credential_epoch: u64,

    /// Generation counter for room-scoped async completions.
    pub room_epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            credential: String::new(),
            conn: ConnState::Disconnected,
            current_room: None,
            messages: Vec::new(),
            room_summaries: Vec::new(),
            current_user: None,
            pending_file: None,
            draft: String::new(),
            credential_epoch: 0,
            room_epoch: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn == ConnState::Connected
    }

    /// Full reset to the initial state. Both epochs advance so in-flight
    /// async completions issued before the reset are discarded on arrival.
    pub fn reset(&mut self) {
        self.credential.clear();
        self.conn = ConnState::Disconnected;
        self.current_room = None;
        self.messages.clear();
        self.room_summaries.clear();
        self.current_user = None;
        self.pending_file = None;
        self.draft.clear();
        self.credential_epoch += 1;
        self.room_epoch += 1;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything_and_advances_epochs() {
        let mut state = SessionState::new();
        state.credential = "T1".into();
        state.conn = ConnState::Connected;
        state.current_room = Some(RoomId::new("r1"));
        state.messages.push(Message::system("joined"));
        state.draft = "half-typed".into();
        let before = (state.credential_epoch, state.room_epoch);

        state.reset();

        assert!(state.credential.is_empty());
        assert_eq!(state.conn, ConnState::Disconnected);
        assert!(state.current_room.is_none());
        assert!(state.messages.is_empty());
        assert!(state.room_summaries.is_empty());
        assert!(state.current_user.is_none());
        assert!(state.pending_file.is_none());
        assert!(state.draft.is_empty());
        assert_eq!(state.credential_epoch, before.0 + 1);
        assert_eq!(state.room_epoch, before.1 + 1);
    }
}
