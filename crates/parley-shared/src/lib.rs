// Wire protocol and domain types shared between the transport and session layers.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::ParleyError;
pub use protocol::{ClientFrame, ServerFrame};
pub use types::{ChatRoomSummary, CurrentUser, FileInfo, Message, MessageKind, RoomId, Sender, UserId};
