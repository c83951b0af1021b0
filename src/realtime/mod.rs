//! Realtime messaging and presence.
//!
//! One task per WebSocket connection. Events from a single connection are
//! handled in receipt order by its receive loop; fan-out goes through
//! per-connection unbounded channels drained by a dedicated writer task.
//!
//! Presence and room membership are process-local and rebuilt from scratch
//! on restart; the message store is the only durable state here.

mod events;
mod presence;
mod rooms;
mod session;
mod socket;

pub use events::{ClientEvent, ErrorCode, ServerEvent};
pub use presence::{PresenceEntry, PresenceRegistry};
pub use rooms::{room_key, RoomRouter};
pub use session::{ChatServer, Session, SessionError};
pub use socket::ws_handler;

use tokio::sync::mpsc;

/// Identifier for one WebSocket connection within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Sender half of a connection's outbound event channel. Cheap to clone;
/// other parts of the system use it to push events to a specific client.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
