//! Shared domain types for PostPilot.
//!
//! This crate contains the core domain types used across the PostPilot
//! backend: Chat, ChatMessage, pagination envelopes, configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
