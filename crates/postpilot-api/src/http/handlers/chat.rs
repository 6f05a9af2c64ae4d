//! Chat CRUD handlers for the REST API.
//!
//! Bodies arrive through `JsonBody`, so a malformed body becomes a 400 with
//! an `{error}` body instead of axum's plain-text rejection.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use postpilot_types::chat::{
    AppendTurnRequest, Chat, ChatPage, ChatSummary, CreateChatRequest, ListChatsQuery,
    UpdateTitleRequest,
};

use crate::http::error::AppError;
use crate::http::extract::JsonBody;
use crate::state::AppState;

/// POST /chat - Start a conversation with its first turn.
pub async fn create_chat(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateChatRequest>,
) -> Result<Json<Chat>, AppError> {
    let chat = state
        .chat_service
        .create_chat(body)
        .await
        .map_err(AppError::during("Failed to create chat"))?;
    Ok(Json(chat))
}

/// PUT /chat - Append a user/assistant turn to an existing chat.
pub async fn append_turn(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AppendTurnRequest>,
) -> Result<Json<Chat>, AppError> {
    let chat = state
        .chat_service
        .append_turn(body)
        .await
        .map_err(AppError::during("Failed to update chat"))?;
    Ok(Json(chat))
}

/// GET /chat/{id} - Fetch one chat with all its messages.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Chat>, AppError> {
    let chat = state
        .chat_service
        .get_chat(&id)
        .await
        .map_err(AppError::during("Failed to fetch chat"))?;
    Ok(Json(chat))
}

/// PATCH /chat/{id} - Replace a chat's title.
pub async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateTitleRequest>,
) -> Result<Json<Chat>, AppError> {
    let chat = state
        .chat_service
        .update_title(&id, body)
        .await
        .map_err(AppError::during("Failed to update chat title"))?;
    Ok(Json(chat))
}

/// DELETE /chat/{id} - Delete a chat and its messages.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state
        .chat_service
        .delete_chat(&id)
        .await
        .map_err(AppError::during("Failed to delete chat"))?;
    Ok(Json(json!({ "message": "Chat deleted successfully" })))
}

/// GET /chats?userId&page&limit - One page of chat summaries, newest first.
pub async fn list_chats(
    State(state): State<AppState>,
    query: Result<Query<ListChatsQuery>, QueryRejection>,
) -> Result<Json<ChatPage<ChatSummary>>, AppError> {
    let Query(query) = query?;
    let page = state
        .chat_service
        .list_chat_summaries(&query)
        .await
        .map_err(AppError::during("Failed to fetch chats"))?;
    Ok(Json(page))
}

/// GET /chat/history?userId&page&limit - One page of full chats, newest first.
pub async fn chat_history(
    State(state): State<AppState>,
    query: Result<Query<ListChatsQuery>, QueryRejection>,
) -> Result<Json<ChatPage<Chat>>, AppError> {
    let Query(query) = query?;
    let page = state
        .chat_service
        .list_chats(&query)
        .await
        .map_err(AppError::during("Failed to fetch chat history"))?;
    Ok(Json(page))
}
