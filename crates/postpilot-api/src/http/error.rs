//! Application error type mapping to HTTP status codes and `{error}` bodies.

use axum::Json;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use postpilot_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input.
    Validation(String),
    /// The addressed resource does not exist.
    NotFound(String),
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// A storage or generation failure, reported with a generic message.
    Internal(String),
}

impl AppError {
    /// Map a `ChatError` from the operation described by `failure`.
    ///
    /// Validation and not-found errors pass through. Everything else is
    /// logged and replaced with `failure`, so provider and storage details
    /// never reach the client.
    pub fn during(failure: &'static str) -> impl Fn(ChatError) -> AppError {
        move |err| match err {
            ChatError::Validation(msg) => AppError::Validation(msg),
            ChatError::NotFound => AppError::NotFound("Chat not found".to_string()),
            other => {
                tracing::error!(error = %other, "{failure}");
                AppError::Internal(failure.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Internal(msg) => msg,
            AppError::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Unreadable request body");
        AppError::Validation("Invalid JSON body".to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(error = %err, "Rejected request body");
        AppError::Validation("Invalid JSON body".to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpilot_types::error::{GenerationError, RepositoryError};

    #[test]
    fn validation_keeps_its_message() {
        let err = AppError::during("Failed to create chat")(ChatError::Validation(
            "userId and message are required".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "userId and message are required");
    }

    #[test]
    fn not_found_is_404() {
        let err = AppError::during("Failed to fetch chat")(ChatError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Chat not found");
    }

    #[test]
    fn internal_failures_hide_details() {
        let err = AppError::during("Failed to update chat")(ChatError::Generation(
            GenerationError::Provider {
                status: 500,
                message: "secret upstream detail".to_string(),
            },
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to update chat");

        let err = AppError::during("Failed to delete chat")(ChatError::Repository(
            RepositoryError::Connection("refused".to_string()),
        ));
        assert_eq!(err.message(), "Failed to delete chat");
    }

    #[test]
    fn unparseable_body_is_validation() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid JSON body");
    }

    #[test]
    fn method_not_allowed_message() {
        assert_eq!(AppError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(AppError::MethodNotAllowed.message(), "Method not allowed");
    }
}
