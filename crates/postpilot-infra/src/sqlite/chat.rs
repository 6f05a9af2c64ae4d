//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `postpilot-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool, writes (in transactions) on the single-connection writer pool.
//!
//! Appends never rewrite the message sequence. Each append is one
//! transaction that bumps `updated_at` (taking SQLite's write lock) and then
//! inserts the new rows after the current maximum `position`, so concurrent
//! appends to the same chat serialize without losing a message.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use postpilot_core::chat::repository::ChatRepository;
use postpilot_types::chat::{Chat, ChatId, ChatMessage, ChatSummary, MessageRole, PageRequest};
use postpilot_types::error::RepositoryError;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use uuid::Uuid;

use super::lazy::LazyDatabase;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    db: LazyDatabase,
}

impl SqliteChatRepository {
    /// Create a new repository reaching the database through `db`.
    pub fn new(db: LazyDatabase) -> Self {
        Self { db }
    }

    async fn pool(&self) -> Result<DatabasePool, RepositoryError> {
        self.db.get().await
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for the `chats` table.
struct ChatRow {
    id: String,
    owner_id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_summary(self) -> Result<ChatSummary, RepositoryError> {
        Ok(ChatSummary {
            id: parse_chat_id(&self.id)?,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }

    fn into_chat(self, messages: Vec<ChatMessage>) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: parse_chat_id(&self.id)?,
            owner_id: self.owner_id,
            title: self.title,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Internal row type for the `chat_messages` table.
struct MessageRow {
    chat_id: String,
    role: String,
    content: String,
    timestamp: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;
        Ok(ChatMessage {
            role,
            content: self.content,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn parse_chat_id(s: &str) -> Result<ChatId, RepositoryError> {
    Uuid::parse_str(s)
        .map(ChatId::from_uuid)
        .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drop precision the store does not keep, so returned values match reads.
fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

async fn insert_messages(
    conn: &mut SqliteConnection,
    chat_id: &ChatId,
    first_position: i64,
    messages: &[ChatMessage],
) -> Result<(), RepositoryError> {
    for (offset, message) in messages.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO chat_messages (chat_id, position, role, content, timestamp)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(chat_id.to_string())
        .bind(first_position + offset as i64)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.timestamp))
        .execute(&mut *conn)
        .await
        .map_err(query_err)?;
    }
    Ok(())
}

/// Load one chat and its messages over a single connection.
async fn fetch_chat(
    conn: &mut SqliteConnection,
    id: &ChatId,
) -> Result<Option<Chat>, RepositoryError> {
    let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(query_err)?;

    let Some(row) = row else {
        return Ok(None);
    };
    let chat_row = ChatRow::from_row(&row).map_err(query_err)?;

    let rows = sqlx::query("SELECT * FROM chat_messages WHERE chat_id = ? ORDER BY position ASC")
        .bind(id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(query_err)?;

    let mut messages = Vec::with_capacity(rows.len());
    for row in &rows {
        messages.push(MessageRow::from_row(row).map_err(query_err)?.into_message()?);
    }

    Ok(Some(chat_row.into_chat(messages)?))
}

/// The owner's chat rows for one page window plus the owner's total.
async fn owner_page(
    pool: &DatabasePool,
    owner_id: &str,
    page: PageRequest,
) -> Result<(Vec<ChatRow>, u64), RepositoryError> {
    let total: i64 = sqlx::query("SELECT COUNT(*) AS cnt FROM chats WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_one(&pool.reader)
        .await
        .and_then(|row| row.try_get("cnt"))
        .map_err(query_err)?;

    let rows = sqlx::query(
        r#"SELECT * FROM chats WHERE owner_id = ?
           ORDER BY updated_at DESC, id DESC
           LIMIT ? OFFSET ?"#,
    )
    .bind(owner_id)
    .bind(i64::from(page.limit))
    .bind(to_i64(page.offset()))
    .fetch_all(&pool.reader)
    .await
    .map_err(query_err)?;

    let mut chat_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        chat_rows.push(ChatRow::from_row(row).map_err(query_err)?);
    }

    Ok((chat_rows, total.max(0) as u64))
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        let pool = self.pool().await?;

        let mut chat = chat.clone();
        chat.created_at = stored_precision(chat.created_at);
        chat.updated_at = stored_precision(chat.updated_at);
        for message in &mut chat.messages {
            message.timestamp = stored_precision(message.timestamp);
        }

        let mut tx = pool.writer.begin().await.map_err(query_err)?;

        sqlx::query(
            r#"INSERT INTO chats (id, owner_id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(&chat.owner_id)
        .bind(&chat.title)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        insert_messages(&mut *tx, &chat.id, 0, &chat.messages).await?;

        tx.commit().await.map_err(query_err)?;

        Ok(chat)
    }

    async fn find_by_id(&self, id: &ChatId) -> Result<Option<Chat>, RepositoryError> {
        let pool = self.pool().await?;
        let mut conn = pool.reader.acquire().await.map_err(query_err)?;
        fetch_chat(&mut *conn, id).await
    }

    async fn append_messages(
        &self,
        id: &ChatId,
        messages: &[ChatMessage],
    ) -> Result<Option<Chat>, RepositoryError> {
        let pool = self.pool().await?;
        let mut tx = pool.writer.begin().await.map_err(query_err)?;

        let touched = sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        if touched.rows_affected() == 0 {
            tx.rollback().await.map_err(query_err)?;
            return Ok(None);
        }

        let next_position: i64 = sqlx::query(
            "SELECT COALESCE(MAX(position) + 1, 0) AS next FROM chat_messages WHERE chat_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .and_then(|row| row.try_get("next"))
        .map_err(query_err)?;

        insert_messages(&mut *tx, id, next_position, messages).await?;

        let chat = fetch_chat(&mut *tx, id).await?;
        tx.commit().await.map_err(query_err)?;

        Ok(chat)
    }

    async fn update_title(&self, id: &ChatId, title: &str) -> Result<Option<Chat>, RepositoryError> {
        let pool = self.pool().await?;
        let mut tx = pool.writer.begin().await.map_err(query_err)?;

        let touched = sqlx::query("UPDATE chats SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(format_datetime(&Utc::now()))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        if touched.rows_affected() == 0 {
            tx.rollback().await.map_err(query_err)?;
            return Ok(None);
        }

        let chat = fetch_chat(&mut *tx, id).await?;
        tx.commit().await.map_err(query_err)?;

        Ok(chat)
    }

    async fn delete_by_id(&self, id: &ChatId) -> Result<bool, RepositoryError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.to_string())
            .execute(&pool.writer)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Chat>, u64), RepositoryError> {
        let pool = self.pool().await?;
        let (chat_rows, total) = owner_page(&pool, owner_id, page).await?;

        if chat_rows.is_empty() {
            return Ok((Vec::new(), total));
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM chat_messages WHERE chat_id IN (");
        let mut ids = builder.separated(", ");
        for row in &chat_rows {
            ids.push_bind(row.id.clone());
        }
        ids.push_unseparated(") ORDER BY chat_id, position ASC");

        let rows = builder
            .build()
            .fetch_all(&pool.reader)
            .await
            .map_err(query_err)?;

        let mut by_chat: HashMap<String, Vec<ChatMessage>> = HashMap::new();
        for row in &rows {
            let message_row = MessageRow::from_row(row).map_err(query_err)?;
            let chat_id = message_row.chat_id.clone();
            by_chat
                .entry(chat_id)
                .or_default()
                .push(message_row.into_message()?);
        }

        let mut chats = Vec::with_capacity(chat_rows.len());
        for row in chat_rows {
            let messages = by_chat.remove(&row.id).unwrap_or_default();
            chats.push(row.into_chat(messages)?);
        }

        Ok((chats, total))
    }

    async fn list_summaries_by_owner(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<ChatSummary>, u64), RepositoryError> {
        let pool = self.pool().await?;
        let (chat_rows, total) = owner_page(&pool, owner_id, page).await?;

        let summaries = chat_rows
            .into_iter()
            .map(ChatRow::into_summary)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((summaries, total))
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        let pool = self.pool().await?;
        let count: i64 = sqlx::query("SELECT COUNT(*) AS cnt FROM chats")
            .fetch_one(&pool.reader)
            .await
            .and_then(|row| row.try_get("cnt"))
            .map_err(query_err)?;
        Ok(count.max(0) as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let pool = self.pool().await?;
        let count: i64 = sqlx::query("SELECT COUNT(*) AS cnt FROM chat_messages")
            .fetch_one(&pool.reader)
            .await
            .and_then(|row| row.try_get("cnt"))
            .map_err(query_err)?;
        Ok(count.max(0) as u64)
    }
}
