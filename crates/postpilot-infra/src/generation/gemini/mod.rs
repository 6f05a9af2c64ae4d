//! Google Gemini `generateContent` provider.

pub mod client;
pub mod persona;
pub mod types;

pub use client::GeminiGenerator;
