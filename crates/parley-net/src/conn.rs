//! Connection task with tokio mpsc command/notification pattern.
//!
//! The websocket event loop runs in a dedicated tokio task. External code
//! communicates with it through typed command and notification channels,
//! keeping the transport fully asynchronous and decoupled from session state.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use parley_shared::constants::{CHAT_NAMESPACE, CONN_COMMAND_BUFFER, CONN_NOTIFICATION_BUFFER};
use parley_shared::protocol::{ClientFrame, ServerFrame};

use crate::codec::{decode_frame, encode_frame};

// ---------------------------------------------------------------------------
// Command / notification types
// ---------------------------------------------------------------------------

/// Commands sent *into* the connection task.
#[derive(Debug)]
pub enum ConnCommand {
    /// Send a protocol frame to the server.
    Send(ClientFrame),
    /// Close the connection and end the task.
    Disconnect,
}

/// Notifications sent *from* the connection task to the session.
#[derive(Debug, Clone)]
pub enum ConnNotification {
    /// The websocket handshake completed.
    Connected,
    /// The connection ended (dial failure, server drop, or explicit disconnect).
    Disconnected { reason: Option<String> },
    /// A protocol frame was received, delivered in receive order.
    Frame(ServerFrame),
}

/// Configuration for spawning a connection.
#[derive(Debug, Clone)]
pub struct ConnConfig {
    /// Base websocket URL, e.g. `ws://127.0.0.1:3000`.
    pub socket_url: String,
    /// Namespace path appended to the base URL.
    pub namespace: String,
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            socket_url: parley_shared::constants::DEFAULT_SOCKET_URL.to_string(),
            namespace: CHAT_NAMESPACE.to_string(),
        }
    }
}

/// Spawn the websocket connection in a background tokio task.
///
/// The handshake authenticates with a bearer `credential` header. The dial
/// itself happens inside the task; its outcome arrives as the first
/// notification (`Connected`, or `Disconnected` with the dial error).
///
/// Returns `(command_tx, notification_rx)`.
pub fn spawn_connection(
    credential: &str,
    config: ConnConfig,
) -> anyhow::Result<(mpsc::Sender<ConnCommand>, mpsc::Receiver<ConnNotification>)> {
    let url = format!("{}{}", config.socket_url, config.namespace);
    let mut request = url.as_str().into_client_request()?;
    request.headers_mut().insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {credential}"))?,
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<ConnCommand>(CONN_COMMAND_BUFFER);
    let (notif_tx, notif_rx) = mpsc::channel::<ConnNotification>(CONN_NOTIFICATION_BUFFER);

    tokio::spawn(async move {
        connection_loop(url, request, cmd_rx, notif_tx).await;
    });

    Ok((cmd_tx, notif_rx))
}

/// Dial the server, then pump commands out and frames in until either side
/// ends the connection. Exactly one `Disconnected` notification is emitted
/// before the task exits.
async fn connection_loop(
    url: String,
    request: tokio_tungstenite::tungstenite::handshake::client::Request,
    mut cmd_rx: mpsc::Receiver<ConnCommand>,
    notif_tx: mpsc::Sender<ConnNotification>,
) {
    let mut ws = match tokio_tungstenite::connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(url = %url, error = %e, "Connection dial failed");
            let _ = notif_tx
                .send(ConnNotification::Disconnected {
                    reason: Some(e.to_string()),
                })
                .await;
            return;
        }
    };

    info!(url = %url, "Connected");
    let _ = notif_tx.send(ConnNotification::Connected).await;

    let reason = loop {
        tokio::select! {
            // --- Outgoing commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ConnCommand::Send(frame)) => {
                        let msg = match encode_frame(&frame) {
                            Ok(m) => m,
                            Err(e) => {
                                warn!(error = %e, "Failed to encode outgoing frame");
                                continue;
                            }
                        };
                        if let Err(e) = ws.send(msg).await {
                            warn!(error = %e, "Send failed");
                            break Some(e.to_string());
                        }
                    }
                    Some(ConnCommand::Disconnect) => {
                        info!("Disconnect requested");
                        let _ = ws.close(None).await;
                        break None;
                    }
                    None => {
                        // All senders dropped
                        debug!("Command channel closed, closing connection");
                        let _ = ws.close(None).await;
                        break None;
                    }
                }
            }

            // --- Incoming websocket messages ---
            msg = ws.next() => {
                match msg {
                    Some(Ok(WsMessage::Close(frame))) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        info!(reason = ?reason, "Server closed connection");
                        break reason;
                    }
                    Some(Ok(msg)) => {
                        match decode_frame(&msg) {
                            Ok(Some(frame)) => {
                                debug!(frame = ?frame_name(&frame), "Frame received");
                                let _ = notif_tx.send(ConnNotification::Frame(frame)).await;
                            }
                            Ok(None) => {}
                            Err(e) => {
                                warn!(error = %e, "Undecodable frame, skipping");
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Connection error");
                        break Some(e.to_string());
                    }
                    None => {
                        info!("Connection stream ended");
                        break None;
                    }
                }
            }
        }
    };

    let _ = notif_tx.send(ConnNotification::Disconnected { reason }).await;
    info!("Connection task terminated");
}

fn frame_name(frame: &ServerFrame) -> &'static str {
    match frame {
        ServerFrame::Ack { .. } => "ack",
        ServerFrame::NewMessage(_) => "new-message",
        ServerFrame::NewMessages(_) => "new-messages",
        ServerFrame::Exception { .. } => "exception",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_shared::types::{Message, RoomId};

    /// End-to-end over a loopback websocket: dial, exchange one frame each
    /// way, observe the server-initiated close.
    #[tokio::test]
    async fn test_connection_loopback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            // Expect the client's join, then push one message and close.
            let msg = ws.next().await.unwrap().unwrap();
            let data = match msg {
                WsMessage::Binary(d) => d.to_vec(),
                other => panic!("Expected binary frame, got {other:?}"),
            };
            match ClientFrame::from_bytes(&data).unwrap() {
                ClientFrame::JoinRoom { room_id } => assert_eq!(room_id, RoomId::new("r1")),
                other => panic!("Expected JoinRoom, got {other:?}"),
            }

            let push = ServerFrame::NewMessage(Message::system("welcome"));
            ws.send(WsMessage::Binary(push.to_bytes().unwrap().into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        });

        let config = ConnConfig {
            socket_url: format!("ws://{addr}"),
            namespace: "/chat".to_string(),
        };
        let (cmd_tx, mut notif_rx) = spawn_connection("t0ken", config).unwrap();

        assert!(matches!(
            notif_rx.recv().await,
            Some(ConnNotification::Connected)
        ));

        cmd_tx
            .send(ConnCommand::Send(ClientFrame::JoinRoom {
                room_id: RoomId::new("r1"),
            }))
            .await
            .unwrap();

        match notif_rx.recv().await {
            Some(ConnNotification::Frame(ServerFrame::NewMessage(m))) => {
                assert_eq!(m.content.as_deref(), Some("welcome"));
            }
            other => panic!("Expected pushed message, got {other:?}"),
        }

        assert!(matches!(
            notif_rx.recv().await,
            Some(ConnNotification::Disconnected { .. })
        ));

        server.await.unwrap();
    }

    /// A dial against nothing reports `Disconnected` instead of `Connected`.
    #[tokio::test]
    async fn test_dial_failure_notifies_disconnected() {
        let config = ConnConfig {
            // Bound then dropped, so nothing is listening.
            socket_url: {
                let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
                let addr = l.local_addr().unwrap();
                drop(l);
                format!("ws://{addr}")
            },
            namespace: "/chat".to_string(),
        };

        let (_cmd_tx, mut notif_rx) = spawn_connection("t0ken", config).unwrap();

        match notif_rx.recv().await {
            Some(ConnNotification::Disconnected { reason }) => assert!(reason.is_some()),
            other => panic!("Expected Disconnected, got {other:?}"),
        }
    }
}
