//! Domain types persisted by the stores.
//!
//! Field shapes and validation bounds follow the data model: message content
//! is 1-1000 characters after trimming, bios are 50-500 characters, and the
//! industry / funding-stage vocabularies are closed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::api::{EVENT_ID_PREFIX, MESSAGE_ID_PREFIX, USER_ID_PREFIX};

// ============================================================================
// Validation Bounds
// ============================================================================

/// Maximum message content length (characters, after trimming).
pub const MAX_MESSAGE_LEN: usize = 1000;
/// Maximum user name length.
pub const MAX_NAME_LEN: usize = 50;
/// Maximum startup name length.
pub const MAX_STARTUP_NAME_LEN: usize = 100;
/// Bio length bounds.
pub const MIN_BIO_LEN: usize = 50;
pub const MAX_BIO_LEN: usize = 500;
/// Event title / description bounds.
pub const MAX_EVENT_TITLE_LEN: usize = 100;
pub const MAX_EVENT_DESCRIPTION_LEN: usize = 1000;
/// Event capacity bounds.
pub const MIN_EVENT_ATTENDEES: u32 = 1;
pub const MAX_EVENT_ATTENDEES: u32 = 1000;

// ============================================================================
// Vocabulary Enums
// ============================================================================

/// Industry vertical of a startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    FinTech,
    HealthTech,
    EdTech,
    CleanTech,
    FoodTech,
    PropTech,
    RetailTech,
    #[serde(rename = "AI/ML")]
    AiMl,
    Blockchain,
    IoT,
    SaaS,
    #[serde(rename = "E-commerce")]
    Ecommerce,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::FinTech => "FinTech",
            Industry::HealthTech => "HealthTech",
            Industry::EdTech => "EdTech",
            Industry::CleanTech => "CleanTech",
            Industry::FoodTech => "FoodTech",
            Industry::PropTech => "PropTech",
            Industry::RetailTech => "RetailTech",
            Industry::AiMl => "AI/ML",
            Industry::Blockchain => "Blockchain",
            Industry::IoT => "IoT",
            Industry::SaaS => "SaaS",
            Industry::Ecommerce => "E-commerce",
        }
    }

    /// Parse from the wire vocabulary. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        const ALL: [Industry; 12] = [
            Industry::FinTech,
            Industry::HealthTech,
            Industry::EdTech,
            Industry::CleanTech,
            Industry::FoodTech,
            Industry::PropTech,
            Industry::RetailTech,
            Industry::AiMl,
            Industry::Blockchain,
            Industry::IoT,
            Industry::SaaS,
            Industry::Ecommerce,
        ];
        ALL.into_iter().find(|i| i.as_str() == value)
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funding stage of a startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingStage {
    #[serde(rename = "Idea Stage")]
    IdeaStage,
    #[serde(rename = "Pre-Seed")]
    PreSeed,
    Seed,
    #[serde(rename = "Series A")]
    SeriesA,
    #[serde(rename = "Series B")]
    SeriesB,
    #[serde(rename = "Series C+")]
    SeriesCPlus,
    #[serde(rename = "Growth Stage")]
    GrowthStage,
}

impl FundingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingStage::IdeaStage => "Idea Stage",
            FundingStage::PreSeed => "Pre-Seed",
            FundingStage::Seed => "Seed",
            FundingStage::SeriesA => "Series A",
            FundingStage::SeriesB => "Series B",
            FundingStage::SeriesCPlus => "Series C+",
            FundingStage::GrowthStage => "Growth Stage",
        }
    }

    /// Parse from the wire vocabulary. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        const ALL: [FundingStage; 7] = [
            FundingStage::IdeaStage,
            FundingStage::PreSeed,
            FundingStage::Seed,
            FundingStage::SeriesA,
            FundingStage::SeriesB,
            FundingStage::SeriesCPlus,
            FundingStage::GrowthStage,
        ];
        ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for FundingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Credential
// ============================================================================

/// Opaque bearer credential attached to a user record.
///
/// Issuance is external to this system (the seeder provisions tokens for
/// demo users). Never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A non-expiring credential with a freshly generated token.
    pub fn generate() -> Self {
        Self {
            token: format!("tok_{}", Ulid::new()),
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

// ============================================================================
// User
// ============================================================================

/// A member profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub startup_name: String,
    pub industry: Industry,
    pub funding_stage: FundingStage,
    pub location: String,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bearer credential; stripped from all API views.
    pub credential: Credential,
}

impl User {
    pub fn new_id() -> String {
        format!("{}{}", USER_ID_PREFIX, Ulid::new())
    }
}

// ============================================================================
// Event
// ============================================================================

/// A community event with RSVP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Start time as "HH:MM".
    pub time: String,
    pub location: String,
    pub organizer: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub max_attendees: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new_id() -> String {
        format!("{}{}", EVENT_ID_PREFIX, Ulid::new())
    }

    pub fn is_full(&self) -> bool {
        self.attendees.len() as u32 >= self.max_attendees
    }
}

// ============================================================================
// Message
// ============================================================================

/// A direct message between two users.
///
/// Immutable once created, except for the one-directional unread -> read
/// transition recorded in `read` / `read_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new unread message with a fresh ID.
    pub fn new(sender: &str, receiver: &str, content: &str) -> Self {
        Self {
            id: format!("{}{}", MESSAGE_ID_PREFIX, Ulid::new()),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            content: content.to_string(),
            read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the message involves the given user as either party.
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender == user_id || self.receiver == user_id
    }
}

/// Per-peer conversation rollup for one user.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub peer_id: String,
    pub last_message: Message,
    pub unread_count: u64,
}
