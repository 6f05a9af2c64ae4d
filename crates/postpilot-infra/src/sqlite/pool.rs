//! SQLite connection pools for chat storage.
//!
//! Chat writes (new chats, appended turns, title edits, deletes) all go
//! through one writer connection, so SQLite never sees two writers racing.
//! Listing and lookups use a separate read-only pool that WAL mode lets run
//! alongside the writer.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const READER_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader and writer pools over the same chat database.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only connections for lookups and listings.
    pub reader: SqlitePool,
    /// The single connection every mutation runs on.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open `database_url`, creating the file if needed, and bring the
    /// schema up to date before any reader connects.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = connect_options(database_url)?;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// WAL journaling with cascading deletes enforced on every connection.
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT))
}
