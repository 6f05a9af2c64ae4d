//! TextGenerator trait definition.
//!
//! A generator turns one prompt into one reply. There is no conversation
//! context, streaming, or retry at this level: a failed call surfaces
//! immediately as a [`GenerationError`].

use postpilot_types::error::GenerationError;

/// Trait for text-generation backends (Gemini, test stubs, ...).
///
/// Implementations live in postpilot-infra (e.g., `GeminiGenerator`).
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate a reply for `prompt` with a single best-effort call.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
