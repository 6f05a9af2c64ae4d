//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools, reached through a lazily-established handle.

pub mod chat;
pub mod lazy;
pub mod pool;
