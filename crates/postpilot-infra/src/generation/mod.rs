//! Text-generation provider implementations.

pub mod gemini;
