//! ChatRepository trait definition.
//!
//! Provides create/read/append/update/delete and per-owner paginated listing
//! for the `Chat` entity.

use postpilot_types::chat::{Chat, ChatId, ChatMessage, ChatSummary, PageRequest};
use postpilot_types::error::RepositoryError;

/// Repository trait for chat persistence.
///
/// Implementations live in postpilot-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Persist a new chat together with its initial messages.
    fn create(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat (with all messages, in conversation order) by ID.
    fn find_by_id(
        &self,
        id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Append messages to the end of a chat's sequence and refresh `updated_at`.
    ///
    /// Must be atomic at the store level: either every message is appended or
    /// none is, and concurrent appends to the same chat never overwrite each
    /// other. Returns `None` when the chat does not exist.
    fn append_messages(
        &self,
        id: &ChatId,
        messages: &[ChatMessage],
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Replace a chat's title and refresh `updated_at`.
    fn update_title(
        &self,
        id: &ChatId,
        title: &str,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Delete a chat and its messages. Returns true if a record was removed.
    fn delete_by_id(
        &self,
        id: &ChatId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List an owner's chats, ordered by updated_at DESC.
    ///
    /// The second element is the owner's total chat count, independent of
    /// the page window.
    fn list_by_owner(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<Chat>, u64), RepositoryError>> + Send;

    /// Same ordering and window as `list_by_owner`, without loading messages.
    fn list_summaries_by_owner(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<ChatSummary>, u64), RepositoryError>> + Send;

    /// Count chats across all owners.
    fn count_chats(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count messages across all chats.
    fn count_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
