//! Business logic and port definitions for PostPilot.
//!
//! This crate defines the "ports" (repository and generator traits) that the
//! infrastructure layer implements, and the chat service that orchestrates
//! them. It depends only on `postpilot-types` -- never on `postpilot-infra`
//! or any database/IO crate.

pub mod chat;
pub mod generation;
