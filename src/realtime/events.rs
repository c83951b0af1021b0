//! Wire events for the realtime socket.
//!
//! Inbound frames are a tagged enum matched exhaustively; an unrecognized
//! `type` fails deserialization and is answered with a `messageError`.

use serde::{Deserialize, Serialize};

use crate::api::{MessageView, UserSummary};

// ============================================================================
// Inbound
// ============================================================================

/// Events a client may send after the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Subscribe to the conversation room with another user. Idempotent.
    JoinConversation { other_user_id: String },
    /// Unsubscribe from the conversation room. No-op if not joined.
    LeaveConversation { other_user_id: String },
    /// Persist a message and fan it out.
    SendMessage { receiver_id: String, content: String },
    /// Ephemeral typing indicator, best-effort.
    Typing { receiver_id: String, is_typing: bool },
    /// Mark all unread messages from `sender_id` to the caller as read.
    MarkAsRead { sender_id: String },
}

// ============================================================================
// Outbound
// ============================================================================

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// A user came online (broadcast to everyone else).
    UserOnline { user_id: String, user: UserSummary },
    /// A user went offline.
    UserOffline { user_id: String },
    /// New message, delivered to the conversation room.
    NewMessage { message: MessageView },
    /// New message, delivered to the receiver's personal channel regardless
    /// of room membership.
    MessageNotification {
        message: MessageView,
        sender: UserSummary,
    },
    /// Typing state of a room peer.
    UserTyping {
        user_id: String,
        user: UserSummary,
        is_typing: bool,
    },
    /// The peer has read the caller's messages.
    MessagesRead { read_by: String },
    /// A request failed; the connection stays open.
    MessageError { code: ErrorCode, message: String },
}

/// Category of a `messageError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Persistence,
}
