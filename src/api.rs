//! Shared API types used by the REST handlers and the realtime layer.
//!
//! These types define the contract between server and client.
//! Changes here affect both sides, preventing silent drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Event, Message, User};

// ============================================================================
// ID Prefixes
// ============================================================================

/// ID prefix for users.
pub const USER_ID_PREFIX: &str = "user_";

/// ID prefix for events.
pub const EVENT_ID_PREFIX: &str = "event_";

/// ID prefix for messages.
pub const MESSAGE_ID_PREFIX: &str = "msg_";

// ============================================================================
// Display Summaries
// ============================================================================

/// Public display fields for a user, used in presence events and
/// message enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

/// Display fields for a conversation peer (includes the startup name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerSummary {
    pub id: String,
    pub name: String,
    pub startup_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl From<&User> for PeerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            startup_name: user.startup_name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

// ============================================================================
// User Types
// ============================================================================

/// Full public view of a user profile. Credentials never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub startup_name: String,
    pub industry: String,
    pub funding_stage: String,
    pub location: String,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            startup_name: user.startup_name.clone(),
            industry: user.industry.as_str().to_string(),
            funding_stage: user.funding_stage.as_str().to_string(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            profile_image: user.profile_image.clone(),
            is_active: user.is_active,
            last_seen: user.last_seen,
            created_at: user.created_at,
        }
    }
}

/// Request to update the caller's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub startup_name: String,
    pub industry: String,
    pub funding_stage: String,
    pub location: String,
    pub bio: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Response for listing users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserView>,
    pub pagination: Pagination,
}

// ============================================================================
// Event Types
// ============================================================================

/// An event with organizer and attendees enriched to display info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: String,
    pub organizer: UserSummary,
    pub attendees: Vec<UserSummary>,
    pub max_attendees: u32,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: String,
    pub max_attendees: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Request to update an existing event. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_attendees: Option<u32>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Response for listing events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEventsResponse {
    pub events: Vec<EventView>,
    pub pagination: Pagination,
}

// ============================================================================
// Message Types
// ============================================================================

/// A persisted message enriched with sender/receiver display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub sender: UserSummary,
    pub receiver: UserSummary,
    pub content: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    /// Enrich a stored message with display info for both parties.
    pub fn new(message: Message, sender: UserSummary, receiver: UserSummary) -> Self {
        Self {
            id: message.id,
            sender,
            receiver,
            content: message.content,
            read: message.read,
            read_at: message.read_at,
            created_at: message.created_at,
        }
    }
}

/// Request to send a message over REST.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub content: String,
}

/// One entry in the caller's conversation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    pub user: PeerSummary,
    pub last_message: MessageView,
    pub unread_count: u64,
}

/// Response for listing conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationView>,
}

/// Response for a conversation history page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMessagesResponse {
    pub messages: Vec<MessageView>,
}

/// Response for bulk mark-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    /// Number of messages newly marked read.
    pub updated: u64,
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Common page/limit query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Resolve page (1-based) and limit with a per-endpoint default limit.
    pub fn resolve(&self, default_limit: u32) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, 100);
        (page, limit)
    }
}

/// Slice one page out of an already-filtered collection.
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> (Vec<T>, Pagination) {
    let total = items.len() as u64;
    let start = ((page - 1) as usize).saturating_mul(limit as usize);
    let page_items = items
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();
    (page_items, Pagination::new(page, limit, total))
}
