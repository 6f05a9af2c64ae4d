//! Chat, message, and pagination types for PostPilot.
//!
//! A `Chat` is one persisted conversation owned by a single user. Its
//! messages are an append-only sequence of user/assistant turns. All types
//! serialize to the camelCase JSON shapes returned by the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a chat, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub Uuid);

impl ChatId {
    /// Create a new ChatId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a ChatId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Author of a message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// When the message was appended to the chat.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A user-authored message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// A generated assistant reply stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A persisted conversation owned by one user.
///
/// `id` and `owner_id` never change after creation. `messages` only grows,
/// and `updated_at` moves forward on every append or title edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    /// Owning user; the partition key for listings.
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Project this chat down to its list-view summary.
    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id,
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// List-view projection of a chat without its messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated page window. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Build a page window, rejecting non-positive values.
    pub fn new(page: i64, limit: i64) -> Option<Self> {
        if page < 1 || limit < 1 {
            return None;
        }
        Some(Self {
            page: u32::try_from(page).ok()?,
            limit: u32::try_from(limit).ok()?,
        })
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination envelope returned alongside every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Count of all the owner's chats, independent of the page window.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// `ceil(total / limit)`.
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// One page of chats (full or summary) plus its pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPage<T> {
    pub chats: Vec<T>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------
//
// Every field is optional so that presence is checked by the chat service,
// which reports missing input as a validation error rather than a decode
// failure.

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
    /// Explicit title; derived from the message when absent.
    pub title: Option<String>,
}

/// Body of `PUT /chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendTurnRequest {
    pub chat_id: Option<String>,
    pub message: Option<String>,
}

/// Body of `PATCH /chat/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: Option<String>,
}

/// Query string of the listing endpoints.
///
/// `page` and `limit` stay raw strings until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChatsQuery {
    pub user_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}
