//! Per-connection session handling.
//!
//! `ChatServer` owns the presence registry and room router and is injected
//! into the HTTP layer through `AppState`; nothing here is a process global.
//! A `Session` is created per authenticated connection and handles that
//! connection's events in receipt order until disconnect.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{MessageView, UserSummary};
use crate::store::{MessageStore, StorageError, User, UserStore, MAX_MESSAGE_LEN};

use super::rooms::room_key;
use super::{
    ClientEvent, ConnectionId, ErrorCode, EventSender, PresenceRegistry, RoomRouter, ServerEvent,
};

// ============================================================================
// Errors
// ============================================================================

/// A failed session operation. Never fatal to the connection; surfaced to
/// the client as a `messageError` event.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("message store unavailable")]
    Persistence(#[from] StorageError),
}

impl SessionError {
    /// The error event emitted back to the offending connection. Store
    /// failures surface as a generic message; details stay in the logs.
    fn to_event(&self) -> ServerEvent {
        let (code, message) = match self {
            SessionError::Validation(msg) => (ErrorCode::Validation, msg.clone()),
            SessionError::NotFound(msg) => (ErrorCode::NotFound, msg.clone()),
            SessionError::Persistence(_) => {
                (ErrorCode::Persistence, "failed to process request".to_string())
            }
        };
        ServerEvent::MessageError { code, message }
    }
}

// ============================================================================
// Chat Server
// ============================================================================

/// Shared realtime state: presence, rooms, and the stores sessions write to.
///
/// Cheap to clone; all clones share the same registries.
#[derive(Clone)]
pub struct ChatServer {
    presence: PresenceRegistry,
    rooms: RoomRouter,
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
    next_connection_id: Arc<AtomicU64>,
}

impl ChatServer {
    pub fn new(users: Arc<dyn UserStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self {
            presence: PresenceRegistry::new(),
            rooms: RoomRouter::new(),
            users,
            messages,
            next_connection_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register an authenticated connection.
    ///
    /// Overwrites any prior presence entry for the same user (last connection
    /// wins), announces the user to everyone else, and returns the session
    /// plus the receiver half of its outbound channel.
    pub fn connect(&self, user: &User) -> (Session, mpsc::UnboundedReceiver<ServerEvent>) {
        let connection_id = ConnectionId(self.next_connection_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();

        let summary = UserSummary::from(user);
        let epoch = self
            .presence
            .register(summary.clone(), connection_id, tx.clone());

        info!(user_id = %user.id, %connection_id, "user connected");

        self.presence.broadcast_except(
            connection_id,
            &ServerEvent::UserOnline {
                user_id: user.id.clone(),
                user: summary,
            },
        );

        let session = Session {
            server: self.clone(),
            user: user.clone(),
            connection_id,
            epoch,
            tx,
            joined: HashSet::new(),
        };
        (session, rx)
    }

    /// The presence registry, for bulk presence queries.
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }
}

// ============================================================================
// Session
// ============================================================================

/// One authenticated connection's state machine.
pub struct Session {
    server: ChatServer,
    user: User,
    connection_id: ConnectionId,
    epoch: u64,
    tx: EventSender,
    /// Room keys this connection is subscribed to.
    joined: HashSet<String>,
}

impl Session {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Handle one inbound event. Errors are emitted back to this connection
    /// only; the connection stays open.
    pub async fn handle(&mut self, event: ClientEvent) {
        let result = match event {
            ClientEvent::JoinConversation { other_user_id } => {
                self.join_conversation(&other_user_id);
                Ok(())
            }
            ClientEvent::LeaveConversation { other_user_id } => {
                self.leave_conversation(&other_user_id);
                Ok(())
            }
            ClientEvent::SendMessage {
                receiver_id,
                content,
            } => self.send_message(&receiver_id, &content).await,
            ClientEvent::Typing {
                receiver_id,
                is_typing,
            } => {
                self.typing(&receiver_id, is_typing);
                Ok(())
            }
            ClientEvent::MarkAsRead { sender_id } => self.mark_read(&sender_id).await,
        };

        if let Err(e) = result {
            if let SessionError::Persistence(source) = &e {
                warn!(user_id = %self.user.id, error = %source, "session operation failed");
            }
            self.emit(e.to_event());
        }
    }

    /// Emit an event to this connection only.
    pub fn emit(&self, event: ServerEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to the conversation room with another user. Idempotent.
    pub fn join_conversation(&mut self, other_user_id: &str) {
        let key = room_key(&self.user.id, other_user_id);
        self.server
            .rooms
            .join(&key, self.connection_id, self.tx.clone());
        self.joined.insert(key.clone());
        debug!(user_id = %self.user.id, room = %key, "joined conversation room");
    }

    /// Unsubscribe from the conversation room. No-op if not joined.
    pub fn leave_conversation(&mut self, other_user_id: &str) {
        let key = room_key(&self.user.id, other_user_id);
        self.server.rooms.leave(&key, self.connection_id);
        self.joined.remove(&key);
        debug!(user_id = %self.user.id, room = %key, "left conversation room");
    }

    /// Validate, persist, and fan out a message.
    ///
    /// The room gets `newMessage`; the receiver's personal channel gets
    /// `messageNotification` whether or not they joined the room.
    pub async fn send_message(
        &mut self,
        receiver_id: &str,
        content: &str,
    ) -> Result<(), SessionError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SessionError::Validation(
                "message content must not be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_MESSAGE_LEN {
            return Err(SessionError::Validation(format!(
                "message content must not exceed {MAX_MESSAGE_LEN} characters"
            )));
        }

        let receiver = self
            .server
            .users
            .get(receiver_id)
            .await?
            .ok_or_else(|| SessionError::NotFound("receiver not found".to_string()))?;

        let message = self
            .server
            .messages
            .create(&self.user.id, &receiver.id, content)
            .await?;

        let sender_summary = UserSummary::from(&self.user);
        let view = MessageView::new(message, sender_summary.clone(), UserSummary::from(&receiver));

        let key = room_key(&self.user.id, &receiver.id);
        self.server.rooms.publish(
            &key,
            &ServerEvent::NewMessage {
                message: view.clone(),
            },
        );

        self.server.presence.notify(
            &receiver.id,
            ServerEvent::MessageNotification {
                message: view,
                sender: sender_summary,
            },
        );

        debug!(from = %self.user.id, to = %receiver.id, "message sent");
        Ok(())
    }

    /// Best-effort typing broadcast to the room, excluding this connection.
    pub fn typing(&self, receiver_id: &str, is_typing: bool) {
        let key = room_key(&self.user.id, receiver_id);
        self.server.rooms.publish_except(
            &key,
            self.connection_id,
            &ServerEvent::UserTyping {
                user_id: self.user.id.clone(),
                user: UserSummary::from(&self.user),
                is_typing,
            },
        );
    }

    /// Mark all unread messages from `sender_id` to this user as read, then
    /// notify the original sender. Idempotent; re-running persists nothing
    /// but still notifies.
    pub async fn mark_read(&mut self, sender_id: &str) -> Result<(), SessionError> {
        let updated = self
            .server
            .messages
            .mark_read(sender_id, &self.user.id)
            .await?;

        self.server.presence.notify(
            sender_id,
            ServerEvent::MessagesRead {
                read_by: self.user.id.clone(),
            },
        );

        debug!(reader = %self.user.id, sender = %sender_id, updated, "messages marked read");
        Ok(())
    }

    /// Terminal cleanup for this connection.
    ///
    /// Leaves all joined rooms and removes the presence entry, but only when
    /// this connection still owns it; a newer registration for the same user
    /// (rapid reconnect) is left intact and no offline event is sent.
    pub async fn disconnect(self) {
        for key in &self.joined {
            self.server.rooms.leave(key, self.connection_id);
        }

        let removed = self.server.presence.unregister(&self.user.id, self.epoch);
        if removed {
            info!(user_id = %self.user.id, connection_id = %self.connection_id, "user disconnected");
            self.server.presence.broadcast_except(
                self.connection_id,
                &ServerEvent::UserOffline {
                    user_id: self.user.id.clone(),
                },
            );

            // Last-seen update happens off the disconnect path.
            let users = self.server.users.clone();
            let user_id = self.user.id.clone();
            tokio::spawn(async move {
                if let Err(e) = users.update_last_seen(&user_id, Utc::now()).await {
                    warn!(%user_id, error = %e, "failed to update last seen");
                }
            });
        } else {
            debug!(
                user_id = %self.user.id,
                connection_id = %self.connection_id,
                "stale disconnect; newer connection already registered"
            );
        }
    }
}
