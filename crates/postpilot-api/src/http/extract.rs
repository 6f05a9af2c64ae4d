//! Request body extraction.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::http::error::AppError;

/// JSON request body parsed regardless of the `content-type` header.
///
/// Clients that post JSON as `text/plain` or with no header at all are
/// accepted. Unreadable or unparseable bodies become a 400
/// `{"error": "Invalid JSON body"}`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(JsonBody(value))
    }
}
