//! Presence registry: who is online, and how to reach them.
//!
//! One entry per connected user, bound to the connection's lifetime. Each
//! registration gets a fresh epoch from a process-wide counter; disconnect
//! cleanup only removes the entry when its epoch still matches, so a rapid
//! reconnect cannot have its new registration torn down by the old
//! connection's cleanup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::api::UserSummary;

use super::{ConnectionId, EventSender, ServerEvent};

/// A currently connected user.
#[derive(Clone)]
pub struct PresenceEntry {
    pub connection_id: ConnectionId,
    pub epoch: u64,
    pub user: UserSummary,
    pub sender: EventSender,
}

/// Process-local registry of connected users.
///
/// Cheap to clone; all clones share the same map. Not shared across
/// horizontally scaled instances.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    entries: Arc<DashMap<String, PresenceEntry>>,
    next_epoch: Arc<AtomicU64>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite-insert an entry for a user. Last connection wins.
    /// Returns the registration epoch for later `unregister` matching.
    pub fn register(
        &self,
        user: UserSummary,
        connection_id: ConnectionId,
        sender: EventSender,
    ) -> u64 {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(
            user.id.clone(),
            PresenceEntry {
                connection_id,
                epoch,
                user,
                sender,
            },
        );
        epoch
    }

    /// Remove a user's entry, but only if it still belongs to the
    /// registration identified by `epoch`. Returns whether an entry was
    /// actually removed.
    pub fn unregister(&self, user_id: &str, epoch: u64) -> bool {
        self.entries
            .remove_if(user_id, |_, entry| entry.epoch == epoch)
            .is_some()
    }

    /// Whether a user currently holds a connection.
    pub fn is_online(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }

    /// Public display info for all currently connected users.
    pub fn snapshot(&self) -> Vec<UserSummary> {
        self.entries.iter().map(|e| e.user.clone()).collect()
    }

    /// Deliver an event to a user's personal channel. Silently dropped if
    /// the user is offline.
    pub fn notify(&self, user_id: &str, event: ServerEvent) {
        if let Some(entry) = self.entries.get(user_id) {
            let _ = entry.sender.send(event);
        }
    }

    /// Deliver an event to every connected user except one connection.
    pub fn broadcast_except(&self, except: ConnectionId, event: &ServerEvent) {
        for entry in self.entries.iter() {
            if entry.connection_id != except {
                let _ = entry.sender.send(event.clone());
            }
        }
    }

    /// Number of currently connected users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
