//! Infrastructure layer for PostPilot.
//!
//! Contains implementations of the traits defined in `postpilot-core`:
//! SQLite chat storage behind a lazily-connected handle, the Gemini text
//! generator, and configuration loading.

pub mod config;
pub mod generation;
pub mod sqlite;
