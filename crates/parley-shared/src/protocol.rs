use serde::{Deserialize, Serialize};

use crate::types::{Message, RoomId};

/// Frames sent from the client to the chat backend over the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientFrame {
    /// Join a room (the server replies with pushes scoped to it)
    JoinRoom { room_id: RoomId },

    /// Leave a room
    LeaveRoom { room_id: RoomId },

    /// Send a text message; `seq` correlates the server acknowledgment
    SendText {
        seq: u64,
        room_id: RoomId,
        content: String,
    },

    /// Send an encoded file payload; `seq` correlates the acknowledgment
    SendFile {
        seq: u64,
        room_id: RoomId,
        file_name: String,
        file_type: String,
        file_size: u64,
        file_data: Vec<u8>,
    },
}

/// Frames pushed from the chat backend to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerFrame {
    /// Acknowledgment for a `SendText` / `SendFile` frame
    Ack { seq: u64, status: Option<String> },

    /// A single new message for the current room
    NewMessage(Message),

    /// A batch of messages, in server order
    NewMessages(Vec<Message>),

    /// Server-side error, surfaced to logs only
    Exception { message: String },
}

impl ClientFrame {
    /// Serialize to binary (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

impl ServerFrame {
    /// Serialize to binary (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageKind, Sender, UserId};
    use chrono::Utc;

    #[test]
    fn test_client_frame_roundtrip() {
        let frame = ClientFrame::SendFile {
            seq: 7,
            room_id: RoomId::new("r1"),
            file_name: "notes.txt".into(),
            file_type: "text/plain".into(),
            file_size: 5,
            file_data: vec![1, 2, 3, 4, 5],
        };

        let bytes = frame.to_bytes().unwrap();
        let restored = ClientFrame::from_bytes(&bytes).unwrap();

        if let (
            ClientFrame::SendFile {
                seq, file_data, ..
            },
            ClientFrame::SendFile {
                seq: seq2,
                file_data: data2,
                ..
            },
        ) = (&frame, &restored)
        {
            assert_eq!(seq, seq2);
            assert_eq!(file_data, data2);
        } else {
            panic!("Frame type mismatch");
        }
    }

    #[test]
    fn test_server_frame_roundtrip() {
        let frame = ServerFrame::NewMessage(Message {
            kind: MessageKind::Text,
            sender: Some(Sender {
                id: UserId("u1".into()),
                display_name: "Ada".into(),
                avatar_url: None,
            }),
            content: Some("hi".into()),
            file: None,
            timestamp: Utc::now(),
        });

        let bytes = frame.to_bytes().unwrap();
        let restored = ServerFrame::from_bytes(&bytes).unwrap();

        match restored {
            ServerFrame::NewMessage(m) => assert_eq!(m.content.as_deref(), Some("hi")),
            other => panic!("Expected NewMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(ServerFrame::from_bytes(&[0xff; 3]).is_err());
    }
}
