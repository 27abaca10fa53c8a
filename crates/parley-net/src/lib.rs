// Realtime transport layer: one websocket connection per credential,
// driven by a dedicated tokio task.

pub mod codec;
pub mod conn;

pub use codec::{decode_frame, encode_frame};
pub use conn::{spawn_connection, ConnCommand, ConnConfig, ConnNotification};
