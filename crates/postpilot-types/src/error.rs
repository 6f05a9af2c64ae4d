use thiserror::Error;

/// Errors from repository operations (used by trait definitions in postpilot-core).
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from the text-generation provider.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("provider returned no text")]
    EmptyResponse,
}

/// Errors related to chat operations.
///
/// `Validation` and `NotFound` are always raised before any side effect.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),

    #[error("chat not found")]
    NotFound,

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_validation_error_displays_bare_message() {
        let err = ChatError::Validation("userId and message are required".to_string());
        assert_eq!(err.to_string(), "userId and message are required");
    }

    #[test]
    fn test_generation_error_converts_into_chat_error() {
        let err: ChatError = GenerationError::RateLimited.into();
        assert!(matches!(err, ChatError::Generation(GenerationError::RateLimited)));
        assert_eq!(err.to_string(), "generation failed: rate limited");
    }
}
