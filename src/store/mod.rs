//! Storage traits and backends.
//!
//! Stores are trait objects so handlers and the realtime layer stay agnostic
//! of the backing implementation. The file backend under [`file`] is the only
//! durable one; presence and room membership deliberately live outside the
//! stores and are rebuilt from scratch on restart.

pub mod error;
pub mod file;
mod models;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use error::{StorageError, StorageResult};
pub use models::{
    ConversationEntry, Credential, Event, FundingStage, Industry, Message, User,
    MAX_BIO_LEN, MAX_EVENT_ATTENDEES, MAX_EVENT_DESCRIPTION_LEN, MAX_EVENT_TITLE_LEN,
    MAX_MESSAGE_LEN, MAX_NAME_LEN, MAX_STARTUP_NAME_LEN, MIN_BIO_LEN, MIN_EVENT_ATTENDEES,
};

// ============================================================================
// User Store
// ============================================================================

/// Durable user directory.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by ID.
    async fn get(&self, id: &str) -> StorageResult<Option<User>>;

    /// All users, in no particular order.
    async fn list(&self) -> StorageResult<Vec<User>>;

    /// Insert a new user.
    async fn create(&self, user: User) -> StorageResult<()>;

    /// Replace an existing user record. Fails with `NotFound` if absent.
    async fn update(&self, user: User) -> StorageResult<()>;

    /// Record the user's last-seen timestamp.
    async fn update_last_seen(&self, id: &str, at: DateTime<Utc>) -> StorageResult<()>;

    /// Resolve a bearer token to its user, comparing in constant time.
    /// Expiry is not checked here; that is the credential validator's job.
    async fn find_by_token(&self, token: &str) -> StorageResult<Option<User>>;
}

// ============================================================================
// Event Store
// ============================================================================

/// Durable event listings.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up an event by ID.
    async fn get(&self, id: &str) -> StorageResult<Option<Event>>;

    /// All events, in no particular order.
    async fn list(&self) -> StorageResult<Vec<Event>>;

    /// Insert a new event.
    async fn create(&self, event: Event) -> StorageResult<()>;

    /// Replace an existing event record. Fails with `NotFound` if absent.
    async fn update(&self, event: Event) -> StorageResult<()>;
}

// ============================================================================
// Message Store
// ============================================================================

/// Durable record of direct messages; the single source of truth for
/// conversation history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new unread message and return it.
    async fn create(&self, sender: &str, receiver: &str, content: &str) -> StorageResult<Message>;

    /// One page of the conversation between two users, newest first.
    /// `page` is 1-based.
    async fn conversation(
        &self,
        user_a: &str,
        user_b: &str,
        page: u32,
        limit: u32,
    ) -> StorageResult<Vec<Message>>;

    /// Mark all unread messages from `sender` to `receiver` as read.
    /// Returns the number of messages newly marked; idempotent.
    async fn mark_read(&self, sender: &str, receiver: &str) -> StorageResult<u64>;

    /// Per-peer conversation rollups for one user, most recent first.
    async fn conversations_for(&self, user_id: &str) -> StorageResult<Vec<ConversationEntry>>;
}
