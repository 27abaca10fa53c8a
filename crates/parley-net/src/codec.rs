//! Mapping between wire frames and websocket messages.
//!
//! All protocol frames travel as binary websocket messages (bincode).
//! Control frames never reach the session layer.

use tokio_tungstenite::tungstenite::Message as WsMessage;

use parley_shared::protocol::{ClientFrame, ServerFrame};
use parley_shared::ParleyError;

/// Encode an outgoing client frame as a binary websocket message.
pub fn encode_frame(frame: &ClientFrame) -> Result<WsMessage, ParleyError> {
    let bytes = frame
        .to_bytes()
        .map_err(|e| ParleyError::Serialization(e.to_string()))?;
    Ok(WsMessage::Binary(bytes.into()))
}

/// Decode an incoming websocket message into a server frame.
///
/// Returns `Ok(None)` for control frames (ping/pong/close) that carry no
/// protocol payload. Text frames are a protocol violation on this channel.
pub fn decode_frame(msg: &WsMessage) -> Result<Option<ServerFrame>, ParleyError> {
    match msg {
        WsMessage::Binary(data) => ServerFrame::from_bytes(data)
            .map(Some)
            .map_err(|e| ParleyError::Serialization(e.to_string())),
        WsMessage::Text(_) => Err(ParleyError::Protocol(
            "unexpected text frame on binary channel".into(),
        )),
        _ => Ok(None),
    }
}
