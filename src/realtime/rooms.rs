//! Conversation room routing.
//!
//! A room is identified by the canonical pair key of its two participants;
//! membership is nothing more than the set of currently subscribed
//! connections. Publishing delivers to every subscriber's outbound channel.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use super::{ConnectionId, EventSender, ServerEvent};

/// Canonical room key for a two-party conversation: the two IDs sorted
/// lexicographically and joined with `-`. Symmetric regardless of call order.
pub fn room_key(user_a: &str, user_b: &str) -> String {
    if user_a <= user_b {
        format!("{user_a}-{user_b}")
    } else {
        format!("{user_b}-{user_a}")
    }
}

/// Routes room-scoped events to subscribed connections.
///
/// Cheap to clone; all clones share the same subscription map.
#[derive(Clone, Default)]
pub struct RoomRouter {
    rooms: Arc<DashMap<String, HashMap<ConnectionId, EventSender>>>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a room. Idempotent.
    pub fn join(&self, key: &str, connection_id: ConnectionId, sender: EventSender) {
        self.rooms
            .entry(key.to_string())
            .or_default()
            .insert(connection_id, sender);
    }

    /// Unsubscribe a connection from a room. No-op if not joined.
    /// Empty rooms are dropped from the map.
    pub fn leave(&self, key: &str, connection_id: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(key) {
            members.remove(&connection_id);
        }
        self.rooms.remove_if(key, |_, members| members.is_empty());
    }

    /// Deliver an event to every connection subscribed to the room.
    pub fn publish(&self, key: &str, event: &ServerEvent) {
        if let Some(members) = self.rooms.get(key) {
            for sender in members.values() {
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Deliver an event to every subscriber except one connection.
    pub fn publish_except(&self, key: &str, except: ConnectionId, event: &ServerEvent) {
        if let Some(members) = self.rooms.get(key) {
            for (id, sender) in members.iter() {
                if *id != except {
                    let _ = sender.send(event.clone());
                }
            }
        }
    }

    /// Number of connections currently subscribed to a room.
    pub fn member_count(&self, key: &str) -> usize {
        self.rooms.get(key).map(|m| m.len()).unwrap_or(0)
    }
}
