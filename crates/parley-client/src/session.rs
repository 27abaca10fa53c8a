//! Session orchestration: credential, connection lifecycle, room membership,
//! and the message channel.
//!
//! The session is single-threaded by construction: command methods and
//! [`Session::apply`] are the only mutation points, and both run on the one
//! task driving the session. Spawned work (fetches, file encoding, the
//! connection task) never touches state directly — completions come back as
//! [`SessionEvent`]s tagged with the epoch they were issued under, and stale
//! ones are discarded on arrival.

use std::collections::HashSet;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use parley_net::{spawn_connection, ConnCommand, ConnConfig, ConnNotification};
use parley_shared::constants::{MAX_MESSAGE_SIZE, SESSION_EVENT_BUFFER};
use parley_shared::protocol::{ClientFrame, ServerFrame};
use parley_shared::types::{ChatRoomSummary, CurrentUser, Message, RoomId};

use crate::config::ClientConfig;
use crate::encoder;
use crate::rest::{RestClient, RestError};
use crate::state::{ConnState, SessionState};

/// Completions delivered to the session's event queue.
///
/// The embedding event loop pumps these through [`Session::apply`] in
/// arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    /// Edge or frame from the connection task, tagged with the connection
    /// generation it belongs to.
    Transport { gen: u64, notif: ConnNotification },

    /// `GET /user` completed.
    UserFetched {
        epoch: u64,
        result: Result<CurrentUser, RestError>,
    },

    /// `GET /chat/rooms` completed.
    RoomsFetched {
        epoch: u64,
        result: Result<Vec<ChatRoomSummary>, RestError>,
    },

    /// The file encoder finished (or failed, with `data: None`).
    FileEncoded {
        epoch: u64,
        room_id: RoomId,
        file_name: String,
        file_type: String,
        data: Option<Bytes>,
    },
}

/// Top-level chat session controller.
pub struct Session {
    config: ClientConfig,
    rest: RestClient,
    state: SessionState,

    /// Command handle into the live connection task, if any.
    conn_tx: Option<mpsc::Sender<ConnCommand>>,

    /// Generation of the current connection; transport events from torn-down
    /// connections carry an older generation and are ignored.
    conn_gen: u64,

    event_tx: mpsc::Sender<SessionEvent>,
    event_rx: mpsc::Receiver<SessionEvent>,

    next_seq: u64,
    /// Sends awaiting a server acknowledgment. Acks are observed and logged
    /// only; nothing blocks on them.
    pending_acks: HashSet<u64>,
}

impl Session {
    pub fn new(config: ClientConfig) -> Self {
        let rest = RestClient::new(config.api_base_url.clone());
        let (event_tx, event_rx) = mpsc::channel(SESSION_EVENT_BUFFER);
        Self {
            config,
            rest,
            state: SessionState::new(),
            conn_tx: None,
            conn_gen: 0,
            event_tx,
            event_rx,
            next_seq: 0,
            pending_acks: HashSet::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Credential / connection lifecycle
    // -----------------------------------------------------------------------

    /// Store a credential. A non-blank credential triggers the identity
    /// fetch and a connection attempt; a blank one just clears the field.
    pub async fn set_credential(&mut self, credential: impl Into<String>) {
        let credential = credential.into();
        self.state.credential = credential.clone();

        if credential.is_empty() {
            debug!("Blank credential, not connecting");
            return;
        }

        self.state.credential_epoch += 1;
        self.state.current_user = None;

        let rest = self.rest.clone();
        let epoch = self.state.credential_epoch;
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = rest.fetch_current_user(&credential).await;
            let _ = event_tx.send(SessionEvent::UserFetched { epoch, result }).await;
        });

        self.connect().await;
    }

    /// Open the realtime connection for the current credential. No-op with a
    /// blank credential. An existing connection is torn down first; there is
    /// never more than one live connection.
    pub async fn connect(&mut self) {
        if self.state.credential.is_empty() {
            debug!("Connect skipped: no credential");
            return;
        }

        if let Some(tx) = self.conn_tx.take() {
            debug!("Tearing down previous connection");
            let _ = tx.send(ConnCommand::Disconnect).await;
            self.state.conn = ConnState::Disconnected;
        }
        self.conn_gen += 1;

        let conn_config = ConnConfig {
            socket_url: self.config.socket_url.clone(),
            namespace: self.config.namespace.clone(),
        };

        match spawn_connection(&self.state.credential, conn_config) {
            Ok((cmd_tx, mut notif_rx)) => {
                self.conn_tx = Some(cmd_tx);
                self.state.conn = ConnState::Connecting;

                let gen = self.conn_gen;
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    while let Some(notif) = notif_rx.recv().await {
                        if event_tx
                            .send(SessionEvent::Transport { gen, notif })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                });

                info!("Connecting");
            }
            Err(e) => {
                warn!(error = %e, "Failed to start connection");
                self.state.conn = ConnState::Disconnected;
            }
        }
    }

    /// Close the connection if one exists. Safe to call at any time.
    pub async fn disconnect(&mut self) {
        if let Some(tx) = self.conn_tx.take() {
            let _ = tx.send(ConnCommand::Disconnect).await;
            info!("Disconnected");
        }
        self.conn_gen += 1;
        self.state.conn = ConnState::Disconnected;
    }

    /// Full teardown: disconnect, clear credential, rooms, log, identity.
    /// Returns the session to its initial state; idempotent.
    pub async fn exit(&mut self) {
        self.disconnect().await;
        self.state.reset();
        self.pending_acks.clear();
        info!("Session reset");
    }

    // -----------------------------------------------------------------------
    // Room membership
    // -----------------------------------------------------------------------

    /// Join a room, implicitly leaving the current one first. Requires a
    /// live connection and a non-empty room id; otherwise a no-op.
    pub async fn join_room(&mut self, room_id: RoomId) {
        if !self.state.is_connected() {
            debug!(room = %room_id, "Join skipped: not connected");
            return;
        }
        if room_id.is_empty() {
            debug!("Join skipped: empty room id");
            return;
        }

        if let Some(old) = self.state.current_room.take() {
            info!(room = %old, "Leaving room");
            self.emit(ClientFrame::LeaveRoom { room_id: old }).await;
            self.state.messages.clear();
        }

        info!(room = %room_id, "Joining room");
        self.state.current_room = Some(room_id.clone());
        self.state.room_epoch += 1;
        self.state.messages.clear();
        self.emit(ClientFrame::JoinRoom { room_id }).await;
    }

    /// Leave the current room. No-op when not connected or not in a room.
    pub async fn leave_room(&mut self) {
        if !self.state.is_connected() {
            debug!("Leave skipped: not connected");
            return;
        }
        let Some(room_id) = self.state.current_room.take() else {
            debug!("Leave skipped: no current room");
            return;
        };

        info!(room = %room_id, "Leaving room");
        self.emit(ClientFrame::LeaveRoom { room_id }).await;
        self.state.room_epoch += 1;
        self.state.messages.clear();
    }

    // -----------------------------------------------------------------------
    // Message channel
    // -----------------------------------------------------------------------

    /// Replace the local input buffer.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    /// Send the input buffer as a text message to the current room.
    ///
    /// The buffer is cleared synchronously after emit, independent of the
    /// acknowledgment (optimistic send). No-op without a connection, a room,
    /// or text to send.
    pub async fn send_text(&mut self) {
        if !self.state.is_connected() {
            debug!("Send skipped: not connected");
            return;
        }
        let Some(room_id) = self.state.current_room.clone() else {
            debug!("Send skipped: no current room");
            return;
        };
        if self.state.draft.is_empty() {
            debug!("Send skipped: empty draft");
            return;
        }
        if self.state.draft.len() > MAX_MESSAGE_SIZE {
            warn!(
                size = self.state.draft.len(),
                max = MAX_MESSAGE_SIZE,
                "Send skipped: message too large"
            );
            return;
        }

        let seq = self.alloc_seq();
        let content = std::mem::take(&mut self.state.draft);
        info!(seq, room = %room_id, "Sending text message");
        self.emit(ClientFrame::SendText {
            seq,
            room_id,
            content,
        })
        .await;
        self.pending_acks.insert(seq);
    }

    /// Stage a local file for sending. Replaces any previous selection.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.state.pending_file = Some(path.into());
    }

    /// Drop the staged file without sending it.
    pub fn clear_file_selection(&mut self) {
        self.state.pending_file = None;
    }

    /// Encode and send the staged file to the current room.
    ///
    /// Encoding runs to completion before the frame is emitted; the emit and
    /// the clearing of the selection happen when the [`SessionEvent::FileEncoded`]
    /// completion is applied. No-op without a connection, a room, or a
    /// selection.
    pub async fn send_file(&mut self) {
        if !self.state.is_connected() {
            debug!("File send skipped: not connected");
            return;
        }
        let Some(room_id) = self.state.current_room.clone() else {
            debug!("File send skipped: no current room");
            return;
        };
        let Some(path) = self.state.pending_file.clone() else {
            debug!("File send skipped: no file selected");
            return;
        };

        let epoch = self.state.room_epoch;
        let file_name = encoder::file_name(&path);
        let file_type = encoder::sniff_mime(&path);
        let event_tx = self.event_tx.clone();

        info!(room = %room_id, file = %file_name, "Encoding file for send");
        tokio::spawn(async move {
            let data = encoder::read_file(&path).await;
            let _ = event_tx
                .send(SessionEvent::FileEncoded {
                    epoch,
                    room_id,
                    file_name,
                    file_type,
                    data,
                })
                .await;
        });
    }

    // -----------------------------------------------------------------------
    // Room list
    // -----------------------------------------------------------------------

    /// Fetch the room list; the completion replaces the local collection
    /// wholesale. No-op with a blank credential.
    pub fn fetch_room_summaries(&mut self) {
        if self.state.credential.is_empty() {
            debug!("Room fetch skipped: no credential");
            return;
        }

        let rest = self.rest.clone();
        let credential = self.state.credential.clone();
        let epoch = self.state.credential_epoch;
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = rest.fetch_rooms(&credential).await;
            let _ = event_tx
                .send(SessionEvent::RoomsFetched { epoch, result })
                .await;
        });
    }

    // -----------------------------------------------------------------------
    // Event processing
    // -----------------------------------------------------------------------

    /// Next queued completion. The embedding loop alternates `next_event`
    /// and [`Session::apply`].
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.event_rx.recv().await
    }

    /// Apply one completion to session state.
    pub async fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Transport { gen, notif } => {
                if gen != self.conn_gen {
                    debug!(gen, current = self.conn_gen, "Stale transport event, discarded");
                    return;
                }
                self.apply_transport(notif);
            }

            SessionEvent::UserFetched { epoch, result } => {
                if epoch != self.state.credential_epoch {
                    debug!(epoch, "Stale user fetch, discarded");
                    return;
                }
                match result {
                    Ok(user) => {
                        info!(user = %user.id, "Identity fetched");
                        self.state.current_user = Some(user);
                    }
                    Err(e) => warn!(error = %e, "User fetch failed"),
                }
            }

            SessionEvent::RoomsFetched { epoch, result } => {
                if epoch != self.state.credential_epoch {
                    debug!(epoch, "Stale room fetch, discarded");
                    return;
                }
                match result {
                    Ok(rooms) => {
                        info!(count = rooms.len(), "Room list fetched");
                        self.state.room_summaries = rooms;
                    }
                    Err(e) => warn!(error = %e, "Room fetch failed"),
                }
            }

            SessionEvent::FileEncoded {
                epoch,
                room_id,
                file_name,
                file_type,
                data,
            } => {
                if epoch != self.state.room_epoch {
                    debug!(epoch, file = %file_name, "Stale file encode, discarded");
                    return;
                }
                let Some(data) = data else {
                    // Encoder already logged the failure; the send is
                    // abandoned and the selection kept.
                    return;
                };

                let seq = self.alloc_seq();
                let file_size = data.len() as u64;
                info!(seq, room = %room_id, file = %file_name, size = file_size, "Sending file message");
                self.emit(ClientFrame::SendFile {
                    seq,
                    room_id,
                    file_name,
                    file_type,
                    file_size,
                    file_data: data.to_vec(),
                })
                .await;
                self.pending_acks.insert(seq);
                self.state.pending_file = None;
            }
        }
    }

    fn apply_transport(&mut self, notif: ConnNotification) {
        match notif {
            ConnNotification::Connected => {
                info!("Connection established");
                self.state.conn = ConnState::Connected;
            }
            ConnNotification::Disconnected { reason } => {
                warn!(reason = ?reason, "Connection lost");
                self.conn_tx = None;
                self.state.conn = ConnState::Disconnected;
            }
            ConnNotification::Frame(frame) => self.apply_frame(frame),
        }
    }

    fn apply_frame(&mut self, frame: ServerFrame) {
        match frame {
            ServerFrame::Ack { seq, status } => {
                if self.pending_acks.remove(&seq) {
                    debug!(seq, status = ?status, "Send acknowledged");
                } else {
                    debug!(seq, "Ack for unknown seq");
                }
            }

            ServerFrame::NewMessage(message) => {
                if self.state.current_room.is_some() {
                    self.state.messages.push(message);
                } else {
                    debug!("Message received outside a room, dropped");
                }
            }

            ServerFrame::NewMessages(messages) => {
                if self.state.current_room.is_some() {
                    self.state.messages.extend(messages);
                } else {
                    debug!(count = messages.len(), "Batch received outside a room, dropped");
                }
            }

            ServerFrame::Exception { message } => {
                warn!(message = %message, "Server exception");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn current_room(&self) -> Option<&RoomId> {
        self.state.current_room.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn room_summaries(&self) -> &[ChatRoomSummary] {
        &self.state.room_summaries
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.state.current_user.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.state.draft
    }

    /// Whether `message` was authored by the current user (sender id
    /// equality; false when either side is unknown).
    pub fn is_own(&self, message: &Message) -> bool {
        match (&self.state.current_user, &message.sender) {
            (Some(user), Some(sender)) => user.id == sender.id,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------

    async fn emit(&mut self, frame: ClientFrame) {
        if let Some(tx) = &self.conn_tx {
            if tx.send(ConnCommand::Send(frame)).await.is_err() {
                warn!("Connection task gone, frame dropped");
            }
        }
    }

    fn alloc_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
