//! HTTP/REST API layer for PostPilot.
//!
//! Axum-based chat API served at the root and under `/api`, with bare JSON
//! bodies, `{"error": ...}` failures, and permissive CORS.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
