//! Client-side access to the chat API.
//!
//! [`ChatBackend`] is the seam between the terminal controller and the
//! server. [`HttpChatBackend`] talks to a running `postpilot serve` over
//! HTTP; tests substitute an in-memory fake.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use postpilot_types::chat::{Chat, ChatId, ChatPage, ChatSummary};

/// Errors seen by the client when calling the chat API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("could not reach server: {0}")]
    Transport(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Operations the chat client needs from the server.
pub trait ChatBackend: Send + Sync {
    fn create_chat(
        &self,
        user_id: &str,
        message: &str,
    ) -> impl Future<Output = Result<Chat, BackendError>> + Send;

    fn append_turn(
        &self,
        chat_id: &ChatId,
        message: &str,
    ) -> impl Future<Output = Result<Chat, BackendError>> + Send;

    fn get_chat(&self, chat_id: &ChatId) -> impl Future<Output = Result<Chat, BackendError>> + Send;

    fn update_title(
        &self,
        chat_id: &ChatId,
        title: &str,
    ) -> impl Future<Output = Result<Chat, BackendError>> + Send;

    fn delete_chat(&self, chat_id: &ChatId) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn list_chats(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<ChatPage<ChatSummary>, BackendError>> + Send;
}

/// [`ChatBackend`] over the REST API under `{base_url}/api`.
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatBackend {
    /// Generation can be slow; leave room beyond the server's own timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("request failed")
                .to_string();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Transport(e.to_string())
}

impl ChatBackend for HttpChatBackend {
    async fn create_chat(&self, user_id: &str, message: &str) -> Result<Chat, BackendError> {
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&json!({ "userId": user_id, "message": message }))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn append_turn(&self, chat_id: &ChatId, message: &str) -> Result<Chat, BackendError> {
        let response = self
            .client
            .put(self.url("/chat"))
            .json(&json!({ "chatId": chat_id.to_string(), "message": message }))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn get_chat(&self, chat_id: &ChatId) -> Result<Chat, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/chat/{chat_id}")))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn update_title(&self, chat_id: &ChatId, title: &str) -> Result<Chat, BackendError> {
        let response = self
            .client
            .patch(self.url(&format!("/chat/{chat_id}")))
            .json(&json!({ "title": title }))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn delete_chat(&self, chat_id: &ChatId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/chat/{chat_id}")))
            .send()
            .await
            .map_err(transport)?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }

    async fn list_chats(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ChatPage<ChatSummary>, BackendError> {
        let response = self
            .client
            .get(self.url("/chats"))
            .query(&[
                ("userId", user_id.to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use postpilot_core::generation::box_generator::BoxTextGenerator;
    use postpilot_core::generation::generator::TextGenerator;
    use postpilot_infra::sqlite::chat::SqliteChatRepository;
    use postpilot_infra::sqlite::lazy::LazyDatabase;
    use postpilot_types::config::AppConfig;
    use postpilot_types::error::GenerationError;

    use crate::http::router::build_router;
    use crate::state::AppState;

    struct Parrot;

    impl TextGenerator for Parrot {
        fn name(&self) -> &str {
            "parrot"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("you said: {prompt}"))
        }
    }

    /// Serve the real router on an ephemeral port.
    async fn spawn_server() -> String {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("client.db").display());
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let state = AppState::from_parts(
            SqliteChatRepository::new(LazyDatabase::new(url.clone())),
            BoxTextGenerator::new(Parrot),
            AppConfig::default(),
            data_dir,
            url,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_http_backend_round_trip() {
        let backend = HttpChatBackend::new(&spawn_server().await).unwrap();

        let chat = backend.create_chat("user-1", "hello").await.unwrap();
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].content, "you said: hello");

        let chat = backend.append_turn(&chat.id, "again").await.unwrap();
        assert_eq!(chat.messages.len(), 4);

        let renamed = backend.update_title(&chat.id, "Greetings").await.unwrap();
        assert_eq!(renamed.title, "Greetings");

        let fetched = backend.get_chat(&chat.id).await.unwrap();
        assert_eq!(fetched.title, "Greetings");

        let page = backend.list_chats("user-1", 1, 10).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.chats[0].id, chat.id);

        backend.delete_chat(&chat.id).await.unwrap();
        let err = backend.get_chat(&chat.id).await.unwrap_err();
        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Chat not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let backend = HttpChatBackend::new("http://127.0.0.1:1").unwrap();
        let err = backend.list_chats("u", 1, 10).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
