//! Chat service implementing the conversation protocol.
//!
//! ChatService coordinates the ChatRepository and a TextGenerator:
//! creating conversations, appending turns, editing titles, deleting, and
//! listing per owner. Validation and not-found checks always run before any
//! side effect, and a failed generation call never leaves a partial turn
//! behind.

use chrono::Utc;
use postpilot_types::chat::{
    AppendTurnRequest, Chat, ChatId, ChatMessage, ChatPage, ChatSummary, CreateChatRequest,
    ListChatsQuery, PageRequest, Pagination, UpdateTitleRequest,
};
use postpilot_types::error::ChatError;
use tracing::{info, warn};

use crate::chat::repository::ChatRepository;
use crate::chat::title::derive_title;
use crate::generation::generator::TextGenerator;

/// Orchestrates chat persistence and reply generation.
///
/// Generic over `ChatRepository` and `TextGenerator` to maintain clean
/// architecture (postpilot-core never depends on postpilot-infra).
pub struct ChatService<R: ChatRepository, G: TextGenerator> {
    repo: R,
    generator: G,
}

impl<R: ChatRepository, G: TextGenerator> ChatService<R, G> {
    pub fn new(repo: R, generator: G) -> Self {
        Self { repo, generator }
    }

    /// Access the chat repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Access the text generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Start a new conversation: one user message and its generated reply.
    pub async fn create_chat(&self, request: CreateChatRequest) -> Result<Chat, ChatError> {
        let (Some(owner_id), Some(message)) =
            (present(request.user_id), present(request.message))
        else {
            return Err(ChatError::Validation(
                "userId and message are required".to_string(),
            ));
        };

        let user_message = ChatMessage::user(message.as_str());
        let reply = self.generator.generate(&message).await?;
        let assistant_message = ChatMessage::assistant(reply);

        let now = Utc::now();
        let chat = Chat {
            id: ChatId::new(),
            owner_id,
            title: derive_title(request.title.as_deref(), &message),
            messages: vec![user_message, assistant_message],
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&chat).await?;
        info!(chat_id = %created.id, owner_id = %created.owner_id, "Chat created");
        Ok(created)
    }

    /// Append one turn (user message + generated reply) to an existing chat.
    ///
    /// Only the new message is sent to the generator; earlier turns are not
    /// forwarded as context.
    pub async fn append_turn(&self, request: AppendTurnRequest) -> Result<Chat, ChatError> {
        let (Some(raw_id), Some(message)) = (present(request.chat_id), present(request.message))
        else {
            return Err(ChatError::Validation(
                "chatId and message are required".to_string(),
            ));
        };
        let chat_id = parse_chat_id(&raw_id)?;

        if self.repo.find_by_id(&chat_id).await?.is_none() {
            return Err(ChatError::NotFound);
        }

        let user_message = ChatMessage::user(message.as_str());
        let reply = self.generator.generate(&message).await?;
        let assistant_message = ChatMessage::assistant(reply);

        let updated = self
            .repo
            .append_messages(&chat_id, &[user_message, assistant_message])
            .await?
            .ok_or_else(|| {
                warn!(chat_id = %chat_id, "Chat disappeared before the turn could be appended");
                ChatError::NotFound
            })?;

        info!(chat_id = %chat_id, messages = updated.messages.len(), "Turn appended");
        Ok(updated)
    }

    /// Fetch a chat by its (string) identifier.
    pub async fn get_chat(&self, chat_id: &str) -> Result<Chat, ChatError> {
        let chat_id = parse_chat_id(chat_id)?;
        self.repo
            .find_by_id(&chat_id)
            .await?
            .ok_or(ChatError::NotFound)
    }

    /// Replace a chat's title.
    pub async fn update_title(
        &self,
        chat_id: &str,
        request: UpdateTitleRequest,
    ) -> Result<Chat, ChatError> {
        let chat_id = parse_chat_id(chat_id)?;
        let Some(title) = present(request.title) else {
            return Err(ChatError::Validation("title is required".to_string()));
        };

        let updated = self
            .repo
            .update_title(&chat_id, &title)
            .await?
            .ok_or(ChatError::NotFound)?;

        info!(chat_id = %chat_id, "Chat title updated");
        Ok(updated)
    }

    /// Delete a chat. Deleting an id that no longer exists is `NotFound`.
    pub async fn delete_chat(&self, chat_id: &str) -> Result<(), ChatError> {
        let chat_id = parse_chat_id(chat_id)?;
        if !self.repo.delete_by_id(&chat_id).await? {
            return Err(ChatError::NotFound);
        }
        info!(chat_id = %chat_id, "Chat deleted");
        Ok(())
    }

    /// One page of an owner's chats with their full message history.
    pub async fn list_chats(&self, query: &ListChatsQuery) -> Result<ChatPage<Chat>, ChatError> {
        let (owner_id, page) = validate_listing(query)?;
        let (chats, total) = self.repo.list_by_owner(&owner_id, page).await?;
        Ok(ChatPage {
            chats,
            pagination: Pagination::new(total, page),
        })
    }

    /// One page of an owner's chat summaries (no messages).
    pub async fn list_chat_summaries(
        &self,
        query: &ListChatsQuery,
    ) -> Result<ChatPage<ChatSummary>, ChatError> {
        let (owner_id, page) = validate_listing(query)?;
        let (chats, total) = self.repo.list_summaries_by_owner(&owner_id, page).await?;
        Ok(ChatPage {
            chats,
            pagination: Pagination::new(total, page),
        })
    }
}

/// Treat empty and whitespace-only strings as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a chat identifier. A malformed id is a client error, never a miss.
fn parse_chat_id(raw: &str) -> Result<ChatId, ChatError> {
    raw.parse()
        .map_err(|_| ChatError::Validation("Invalid chat ID format".to_string()))
}

fn validate_listing(query: &ListChatsQuery) -> Result<(String, PageRequest), ChatError> {
    let Some(owner_id) = present(query.user_id.clone()) else {
        return Err(ChatError::Validation("userId is required".to_string()));
    };

    let page = parse_window_value(query.page.as_deref(), PageRequest::DEFAULT_PAGE)?;
    let limit = parse_window_value(query.limit.as_deref(), PageRequest::DEFAULT_LIMIT)?;
    let window = PageRequest::new(page, limit).ok_or_else(window_error)?;

    Ok((owner_id, window))
}

fn parse_window_value(raw: Option<&str>, default: u32) -> Result<i64, ChatError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse::<i64>().map_err(|_| window_error()),
        None => Ok(i64::from(default)),
    }
}

fn window_error() -> ChatError {
    ChatError::Validation("Page and limit must be positive integers".to_string())
}
