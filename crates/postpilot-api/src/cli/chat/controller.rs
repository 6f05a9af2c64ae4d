//! Client-side chat controller.
//!
//! `ChatController` is the state behind the terminal chat: who is chatting,
//! which conversation is open, the visible messages, and the sidebar list of
//! the user's chats. Each operation calls the [`ChatBackend`] and folds the
//! result into that state. Failures are stored in `error` for display and
//! never abort the session.

use tracing::warn;

use postpilot_types::chat::{Chat, ChatId, ChatMessage, ChatSummary, PageRequest};

use super::backend::ChatBackend;

pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
pub const LOAD_FAILED: &str = "Failed to load chat. Please try again.";
pub const LIST_FAILED: &str = "Failed to load chats. Please try again.";
pub const RENAME_FAILED: &str = "Failed to update chat title. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete chat. Please try again.";

/// Local assistant reply shown when a send fails. Never persisted.
pub const APOLOGY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// State machine for one user's terminal chat session.
pub struct ChatController<B: ChatBackend> {
    backend: B,
    user_id: String,
    current_chat_id: Option<ChatId>,
    current_title: Option<String>,
    messages: Vec<ChatMessage>,
    chats: Vec<ChatSummary>,
    loading: bool,
    error: Option<String>,
}

impl<B: ChatBackend> ChatController<B> {
    pub fn new(backend: B, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
            current_chat_id: None,
            current_title: None,
            messages: Vec::new(),
            chats: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn current_chat_id(&self) -> Option<ChatId> {
        self.current_chat_id
    }

    pub fn current_title(&self) -> Option<&str> {
        self.current_title.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn chats(&self) -> &[ChatSummary] {
        &self.chats
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Send a message in the current chat, starting a new chat if none is open.
    ///
    /// The user message is shown immediately. On success the server's copy of
    /// the conversation replaces the local one; on failure a local apology is
    /// appended after the user message.
    pub async fn send(&mut self, text: &str) {
        if text.trim().is_empty() || self.loading {
            return;
        }

        self.messages.push(ChatMessage::user(text));
        self.loading = true;
        self.error = None;

        let result = match self.current_chat_id {
            Some(id) => self.backend.append_turn(&id, text).await.map(|chat| (chat, false)),
            None => self
                .backend
                .create_chat(&self.user_id, text)
                .await
                .map(|chat| (chat, true)),
        };

        match result {
            Ok((chat, created)) => {
                self.adopt(chat);
                if created {
                    self.refresh().await;
                }
            }
            Err(err) => {
                warn!(error = %err, "Sending message failed");
                self.error = Some(SEND_FAILED.to_string());
                self.messages.push(ChatMessage::assistant(APOLOGY));
            }
        }

        self.loading = false;
    }

    /// Open an existing chat.
    pub async fn load(&mut self, chat_id: ChatId) {
        self.loading = true;
        self.error = None;

        match self.backend.get_chat(&chat_id).await {
            Ok(chat) => self.adopt(chat),
            Err(err) => {
                warn!(error = %err, chat_id = %chat_id, "Loading chat failed");
                self.error = Some(LOAD_FAILED.to_string());
            }
        }

        self.loading = false;
    }

    /// Rename the open chat. Does nothing without an open chat or a title.
    pub async fn rename(&mut self, title: &str) {
        let title = title.trim();
        let Some(chat_id) = self.current_chat_id else {
            return;
        };
        if title.is_empty() {
            return;
        }

        self.error = None;
        match self.backend.update_title(&chat_id, title).await {
            Ok(_) => {
                self.current_title = Some(title.to_string());
                if let Some(entry) = self.chats.iter_mut().find(|c| c.id == chat_id) {
                    entry.title = title.to_string();
                }
            }
            Err(err) => {
                warn!(error = %err, chat_id = %chat_id, "Renaming chat failed");
                self.error = Some(RENAME_FAILED.to_string());
            }
        }
    }

    /// Delete a chat. Deleting the open chat returns to a blank new chat.
    pub async fn delete(&mut self, chat_id: ChatId) {
        self.error = None;
        match self.backend.delete_chat(&chat_id).await {
            Ok(()) => {
                self.chats.retain(|c| c.id != chat_id);
                if self.current_chat_id == Some(chat_id) {
                    self.new_chat();
                }
            }
            Err(err) => {
                warn!(error = %err, chat_id = %chat_id, "Deleting chat failed");
                self.error = Some(DELETE_FAILED.to_string());
            }
        }
    }

    /// Close the open chat; the next send starts a new one.
    pub fn new_chat(&mut self) {
        self.current_chat_id = None;
        self.current_title = None;
        self.messages.clear();
        self.error = None;
    }

    /// Reload the first page of the user's chat list.
    pub async fn refresh(&mut self) {
        let window = PageRequest::default();
        match self
            .backend
            .list_chats(&self.user_id, window.page, window.limit)
            .await
        {
            Ok(page) => self.chats = page.chats,
            Err(err) => {
                warn!(error = %err, "Refreshing chat list failed");
                self.error = Some(LIST_FAILED.to_string());
            }
        }
    }

    fn adopt(&mut self, chat: Chat) {
        self.current_chat_id = Some(chat.id);
        self.current_title = Some(chat.title);
        self.messages = chat.messages;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use postpilot_types::chat::{ChatPage, MessageRole, Pagination};

    use crate::cli::chat::backend::BackendError;

    /// In-memory backend that mirrors the server's behavior.
    #[derive(Default)]
    struct FakeBackend {
        chats: Mutex<HashMap<ChatId, Chat>>,
        fail: Mutex<bool>,
        list_calls: Mutex<usize>,
    }

    impl FakeBackend {
        fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn check(&self) -> Result<(), BackendError> {
            if *self.fail.lock().unwrap() {
                Err(BackendError::Status {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }

        fn missing() -> BackendError {
            BackendError::Status {
                status: 404,
                message: "Chat not found".to_string(),
            }
        }
    }

    impl ChatBackend for FakeBackend {
        async fn create_chat(&self, user_id: &str, message: &str) -> Result<Chat, BackendError> {
            self.check()?;
            let now = Utc::now();
            let chat = Chat {
                id: ChatId::new(),
                owner_id: user_id.to_string(),
                title: message.to_string(),
                messages: vec![
                    ChatMessage::user(message),
                    ChatMessage::assistant(format!("re: {message}")),
                ],
                created_at: now,
                updated_at: now,
            };
            self.chats.lock().unwrap().insert(chat.id, chat.clone());
            Ok(chat)
        }

        async fn append_turn(&self, chat_id: &ChatId, message: &str) -> Result<Chat, BackendError> {
            self.check()?;
            let mut chats = self.chats.lock().unwrap();
            let chat = chats.get_mut(chat_id).ok_or_else(Self::missing)?;
            chat.messages.push(ChatMessage::user(message));
            chat.messages.push(ChatMessage::assistant(format!("re: {message}")));
            chat.updated_at = Utc::now();
            Ok(chat.clone())
        }

        async fn get_chat(&self, chat_id: &ChatId) -> Result<Chat, BackendError> {
            self.check()?;
            self.chats
                .lock()
                .unwrap()
                .get(chat_id)
                .cloned()
                .ok_or_else(Self::missing)
        }

        async fn update_title(&self, chat_id: &ChatId, title: &str) -> Result<Chat, BackendError> {
            self.check()?;
            let mut chats = self.chats.lock().unwrap();
            let chat = chats.get_mut(chat_id).ok_or_else(Self::missing)?;
            chat.title = title.to_string();
            Ok(chat.clone())
        }

        async fn delete_chat(&self, chat_id: &ChatId) -> Result<(), BackendError> {
            self.check()?;
            self.chats
                .lock()
                .unwrap()
                .remove(chat_id)
                .map(|_| ())
                .ok_or_else(Self::missing)
        }

        async fn list_chats(
            &self,
            user_id: &str,
            page: u32,
            limit: u32,
        ) -> Result<ChatPage<ChatSummary>, BackendError> {
            self.check()?;
            *self.list_calls.lock().unwrap() += 1;
            let mut chats: Vec<ChatSummary> = self
                .chats
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.owner_id == user_id)
                .map(Chat::summary)
                .collect();
            chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            let request = PageRequest { page, limit };
            let total = chats.len() as u64;
            Ok(ChatPage {
                chats,
                pagination: Pagination::new(total, request),
            })
        }
    }

    fn controller() -> ChatController<FakeBackend> {
        ChatController::new(FakeBackend::default(), "user-1")
    }

    #[tokio::test]
    async fn first_send_creates_chat_and_refreshes_list() {
        let mut ctl = controller();
        ctl.send("hello").await;

        let id = ctl.current_chat_id().unwrap();
        assert_eq!(ctl.current_title(), Some("hello"));
        assert_eq!(ctl.messages().len(), 2);
        assert_eq!(ctl.chats().len(), 1);
        assert_eq!(ctl.chats()[0].id, id);
        assert_eq!(*ctl.backend.list_calls.lock().unwrap(), 1);
        assert!(!ctl.is_loading());
        assert!(ctl.error().is_none());
    }

    #[tokio::test]
    async fn later_sends_append_to_the_open_chat() {
        let mut ctl = controller();
        ctl.send("one").await;
        let id = ctl.current_chat_id();
        ctl.send("two").await;

        assert_eq!(ctl.current_chat_id(), id);
        assert_eq!(ctl.messages().len(), 4);
        assert_eq!(ctl.messages()[3].content, "re: two");
        // Only the creating send refreshes the list.
        assert_eq!(*ctl.backend.list_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut ctl = controller();
        ctl.send("   ").await;
        assert!(ctl.messages().is_empty());
        assert!(ctl.current_chat_id().is_none());
    }

    #[tokio::test]
    async fn failed_send_keeps_user_message_and_adds_apology() {
        let mut ctl = controller();
        ctl.backend.set_failing(true);
        ctl.send("hello").await;

        assert_eq!(ctl.error(), Some(SEND_FAILED));
        assert_eq!(ctl.messages().len(), 2);
        assert_eq!(ctl.messages()[0].role, MessageRole::User);
        assert_eq!(ctl.messages()[0].content, "hello");
        assert_eq!(ctl.messages()[1].role, MessageRole::Assistant);
        assert_eq!(ctl.messages()[1].content, APOLOGY);
        assert!(ctl.current_chat_id().is_none());
        assert!(ctl.backend.chats.lock().unwrap().is_empty());
        assert!(!ctl.is_loading());

        // A later success clears the error.
        ctl.backend.set_failing(false);
        ctl.send("retry").await;
        assert!(ctl.error().is_none());
        assert_eq!(ctl.messages().len(), 2);
    }

    #[tokio::test]
    async fn load_adopts_chat() {
        let mut ctl = controller();
        ctl.send("first chat").await;
        let first = ctl.current_chat_id().unwrap();
        ctl.new_chat();
        ctl.send("second chat").await;

        ctl.load(first).await;
        assert_eq!(ctl.current_chat_id(), Some(first));
        assert_eq!(ctl.current_title(), Some("first chat"));
        assert_eq!(ctl.messages()[0].content, "first chat");

        ctl.load(ChatId::new()).await;
        assert_eq!(ctl.error(), Some(LOAD_FAILED));
        assert_eq!(ctl.current_chat_id(), Some(first));
    }

    #[tokio::test]
    async fn rename_updates_title_and_list_entry() {
        let mut ctl = controller();
        ctl.rename("no chat open").await;
        assert!(ctl.current_title().is_none());

        ctl.send("hello").await;
        ctl.rename("   ").await;
        assert_eq!(ctl.current_title(), Some("hello"));

        ctl.rename("Greeting").await;
        assert_eq!(ctl.current_title(), Some("Greeting"));
        assert_eq!(ctl.chats()[0].title, "Greeting");
    }

    #[tokio::test]
    async fn deleting_open_chat_resets_to_new_chat() {
        let mut ctl = controller();
        ctl.send("keep").await;
        let keep = ctl.current_chat_id().unwrap();
        ctl.new_chat();
        ctl.send("drop").await;
        let dropped = ctl.current_chat_id().unwrap();
        ctl.refresh().await;
        assert_eq!(ctl.chats().len(), 2);

        ctl.delete(dropped).await;
        assert!(ctl.current_chat_id().is_none());
        assert!(ctl.messages().is_empty());
        assert_eq!(ctl.chats().len(), 1);
        assert_eq!(ctl.chats()[0].id, keep);
    }

    #[tokio::test]
    async fn deleting_other_chat_keeps_current() {
        let mut ctl = controller();
        ctl.send("other").await;
        let other = ctl.current_chat_id().unwrap();
        ctl.new_chat();
        ctl.send("current").await;
        let current = ctl.current_chat_id().unwrap();

        ctl.delete(other).await;
        assert_eq!(ctl.current_chat_id(), Some(current));
        assert_eq!(ctl.messages().len(), 2);

        ctl.delete(other).await;
        assert_eq!(ctl.error(), Some(DELETE_FAILED));
    }
}
